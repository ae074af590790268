diesel::table! {
    activity_logs (id) {
        id -> Uuid,
        employee_id -> Uuid,
        employee_name -> Text,
        activity_type -> Text,
        description -> Text,
        metadata -> Jsonb,
        recorded_at -> Timestamptz,
    }
}
