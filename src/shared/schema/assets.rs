diesel::table! {
    assets (id) {
        id -> Uuid,
        serial_number -> Text,
        model_name -> Text,
        status -> Text,
        condition -> Text,
        current_location_id -> Nullable<Uuid>,
        cost -> Float8,
        purchase_date -> Nullable<Date>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    spare_parts (id) {
        id -> Uuid,
        name -> Text,
        part_number -> Text,
        stock -> Int4,
        min_stock -> Int4,
        price -> Float8,
        image_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
