diesel::table! {
    maintenance_tasks (id) {
        id -> Uuid,
        asset_id -> Uuid,
        title -> Text,
        description -> Nullable<Text>,
        priority -> Text,
        status -> Text,
        assigned_to -> Nullable<Uuid>,
        scheduled_date -> Nullable<Timestamptz>,
        started_date -> Nullable<Timestamptz>,
        completed_date -> Nullable<Timestamptz>,
        estimated_hours -> Nullable<Float8>,
        actual_hours -> Nullable<Float8>,
        notes -> Nullable<Text>,
        total_cost -> Float8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    task_part_usage (id) {
        id -> Uuid,
        task_id -> Uuid,
        part_id -> Uuid,
        quantity -> Int4,
        price_at_time -> Float8,
        created_at -> Timestamptz,
    }
}
