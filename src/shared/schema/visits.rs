diesel::table! {
    visits (id) {
        id -> Uuid,
        employee_id -> Uuid,
        location_id -> Uuid,
        check_in_time -> Timestamptz,
        check_out_time -> Nullable<Timestamptz>,
        objectives -> Array<Text>,
        notes -> Nullable<Text>,
        images -> Array<Text>,
        met_owner -> Bool,
        created_at -> Timestamptz,
    }
}
