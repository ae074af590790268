diesel::table! {
    projects (id) {
        id -> Uuid,
        name -> Text,
        company_id -> Nullable<Uuid>,
        description -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    products (id) {
        id -> Uuid,
        project_id -> Uuid,
        name -> Text,
        description -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    samples (id) {
        id -> Uuid,
        product_id -> Uuid,
        sample_number -> Text,
        version -> Int4,
        status -> Text,
        sent_by -> Uuid,
        due_date -> Nullable<Date>,
        notes -> Nullable<Text>,
        images -> Array<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    sample_feedback (id) {
        id -> Uuid,
        sample_id -> Uuid,
        feedback_by -> Uuid,
        visit_id -> Nullable<Uuid>,
        rating -> Nullable<Int4>,
        customer_reaction -> Nullable<Text>,
        comments -> Nullable<Text>,
        images -> Array<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    rnd_tasks (id) {
        id -> Uuid,
        project_id -> Uuid,
        sample_id -> Nullable<Uuid>,
        title -> Text,
        description -> Nullable<Text>,
        task_type -> Text,
        assignee_id -> Uuid,
        created_by -> Uuid,
        due_date -> Nullable<Timestamptz>,
        priority -> Text,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
