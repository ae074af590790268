diesel::table! {
    sales_tasks (id) {
        id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        objectives -> Array<Text>,
        assignee_id -> Uuid,
        company_id -> Nullable<Uuid>,
        location_id -> Nullable<Uuid>,
        due_date -> Timestamptz,
        priority -> Text,
        status -> Text,
        completion_note -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
