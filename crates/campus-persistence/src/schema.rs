// Esquema Diesel compartido por ambos backends (Postgres y SQLite).
// Tablas: requests, request_history, notifications
use diesel::allow_tables_to_appear_in_same_query;
diesel::table! {
    requests (id) {
        id -> Text,
        kind -> Text,
        subject_id -> Text,
        payload -> Text,
        phase -> Text,
        stage -> Nullable<Text>,
        version -> BigInt,
        created_at_ts -> BigInt,
        updated_at_ts -> BigInt,
    }
}
diesel::table! {
    request_history (id) {
        id -> Text,
        request_id -> Text,
        seq -> BigInt,
        role -> Text,
        actor_name -> Text,
        action -> Text,
        comment -> Nullable<Text>,
        forwarded_to -> Nullable<Text>,
        command_id -> Nullable<Text>,
        created_at_ts -> BigInt,
    }
}
diesel::table! {
    notifications (id) {
        id -> Text,
        subject_id -> Text,
        event -> Text,
        title -> Text,
        message -> Text,
        related_request_id -> Text,
        read_flag -> Bool,
        created_at_ts -> BigInt,
    }
}
allow_tables_to_appear_in_same_query!(requests, request_history, notifications);
