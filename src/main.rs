use campus_domain::{RequestKind, Role};
use campus_workflow::{ApprovalService, WorkflowError};
use std::error::Error;
use std::io::{self, Write};
use uuid::Uuid;

/// Pequeño menú interactivo para administrar solicitudes con workflow
/// usando el servicio respaldado por `campus-persistence`.
///
/// Opciones soportadas:
/// 1) Ver el worklist de un rol
/// 2) Crear solicitud
/// 3) Aprobar (o reenviar, según la plantilla)
/// 4) Rechazar con motivo
/// 5) Ver historial de una solicitud
/// 6) Ver notificaciones de un sujeto
/// 7) Salir
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    // Inicializar servicio (aplica migraciones embebidas si procede)
    let service = ApprovalService::new_from_env().map_err(|e| Box::new(e) as Box<dyn Error>)?;
    log::info!("servicio de workflow inicializado");

    loop {
        println!("\n== Campus workflow menu ==");
        println!("1) Ver worklist de un rol");
        println!("2) Crear solicitud");
        println!("3) Aprobar solicitud");
        println!("4) Rechazar solicitud");
        println!("5) Ver historial de una solicitud");
        println!("6) Ver notificaciones de un sujeto");
        println!("7) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        match choice.trim() {
            "1" => {
                let role = match read_role()? {
                    Some(r) => r,
                    None => continue,
                };
                match service.list_actionable(role) {
                    Ok(list) => {
                        println!("\nID                                   | KIND             | SUBJECT    | STATUS");
                        println!("--------------------------------------------------------------------------------");
                        for r in list {
                            println!("{} | {:<16} | {:<10} | {}",
                                     r.id(),
                                     r.kind().as_str(),
                                     r.subject_id(),
                                     r.status().label());
                        }
                    }
                    Err(e) => eprintln!("Error listando worklist: {}", e),
                }
            }
            "2" => {
                let kind_s = prompt("Kind (achievement/certificate/maintenance/library_resource/library_timing): ")?;
                let kind: RequestKind = match kind_s.trim().parse() {
                    Ok(k) => k,
                    Err(e) => { eprintln!("{}", e); continue; }
                };
                let subject = prompt("Subject id: ")?;
                let payload_s = prompt("Payload (objeto JSON, ej: {\"title\": \"...\"}): ")?;
                let payload: serde_json::Value = match serde_json::from_str(payload_s.trim()) {
                    Ok(v) => v,
                    Err(e) => { eprintln!("JSON inválido: {}", e); continue; }
                };
                match service.create_request(kind, subject.trim(), payload) {
                    Ok(id) => println!("Solicitud creada: {}", id),
                    Err(e) => eprintln!("Error creando solicitud: {}", e),
                }
            }
            "3" => {
                let (id, role, name) = match read_actor_and_id()? {
                    Some(t) => t,
                    None => continue,
                };
                let comment_s = prompt("Comentario (enter para ninguno): ")?;
                let comment = if comment_s.trim().is_empty() { None } else { Some(comment_s.trim().to_string()) };
                match service.approve(id, role, name.trim(), comment) {
                    Ok(req) => println!("Solicitud {}: {}", req.id(), req.status().label()),
                    Err(e) => report(e),
                }
            }
            "4" => {
                let (id, role, name) = match read_actor_and_id()? {
                    Some(t) => t,
                    None => continue,
                };
                let reason = prompt("Motivo del rechazo: ")?;
                match service.reject(id, role, name.trim(), reason.trim()) {
                    Ok(req) => println!("Solicitud {}: {}", req.id(), req.status().label()),
                    Err(e) => report(e),
                }
            }
            "5" => {
                let id = match read_uuid("Request id (UUID): ")? {
                    Some(u) => u,
                    None => continue,
                };
                match service.get_request(&id) {
                    Ok(req) => {
                        println!("\n{} [{}] — {}", req.id(), req.kind(), req.status().label());
                        for e in req.history() {
                            let comment = e.comment.as_deref().unwrap_or("-");
                            println!("{} | {:<22} | {:<9} | {}",
                                     e.at.to_rfc3339(),
                                     e.role.as_str(),
                                     e.action.as_str(),
                                     comment);
                        }
                    }
                    Err(e) => report(e),
                }
            }
            "6" => {
                let subject = prompt("Subject id: ")?;
                match service.notifications_for(subject.trim()) {
                    Ok(notes) => {
                        for n in notes {
                            let mark = if n.read { " " } else { "*" };
                            println!("{} [{}] {} — {}", mark, n.event, n.title, n.message);
                        }
                    }
                    Err(e) => report(e),
                }
            }
            "7" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

/// Mensaje legible por clase de error; el worklist queda como estaba en
/// cualquier fallo.
fn report(e: WorkflowError) {
    match &e {
        WorkflowError::WrongApprover { .. } => eprintln!("Fuera de turno: {}", e),
        WorkflowError::StaleOrTerminal(_) => eprintln!("La solicitud ya está cerrada: {}", e),
        WorkflowError::ConcurrentModification(_) => {
            eprintln!("Otro aprobador actuó primero; recarga el worklist: {}", e)
        }
        _ => eprintln!("Error: {}", e),
    }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}

fn read_role() -> io::Result<Option<Role>> {
    let s = prompt("Rol (ej: teacher, hod, clerk, electrical_technician): ")?;
    match s.trim().parse::<Role>() {
        Ok(r) => Ok(Some(r)),
        Err(e) => {
            eprintln!("{}", e);
            Ok(None)
        }
    }
}

fn read_uuid(msg: &str) -> io::Result<Option<Uuid>> {
    let s = prompt(msg)?;
    match Uuid::parse_str(s.trim()) {
        Ok(u) => Ok(Some(u)),
        Err(_) => {
            eprintln!("UUID inválido");
            Ok(None)
        }
    }
}

fn read_actor_and_id() -> io::Result<Option<(Uuid, Role, String)>> {
    let id = match read_uuid("Request id (UUID): ")? {
        Some(u) => u,
        None => return Ok(None),
    };
    let role = match read_role()? {
        Some(r) => r,
        None => return Ok(None),
    };
    let name = prompt("Nombre del actor: ")?;
    Ok(Some((id, role, name)))
}
