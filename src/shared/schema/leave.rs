diesel::table! {
    leave_requests (id) {
        id -> Uuid,
        employee_id -> Uuid,
        leave_type -> Text,
        status -> Text,
        start_date -> Date,
        end_date -> Date,
        days -> Float8,
        half_day_period -> Nullable<Text>,
        is_paid -> Bool,
        reason -> Nullable<Text>,
        reviewed_by -> Nullable<Uuid>,
        reviewed_at -> Nullable<Timestamptz>,
        review_note -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
