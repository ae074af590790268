diesel::table! {
    companies (id) {
        id -> Uuid,
        name -> Text,
        tax_id -> Nullable<Text>,
        logo_url -> Nullable<Text>,
        grade -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    locations (id) {
        id -> Uuid,
        company_id -> Uuid,
        code -> Text,
        name -> Text,
        address -> Text,
        district -> Text,
        province -> Text,
        postal_code -> Text,
        region -> Nullable<Text>,
        lat -> Nullable<Float8>,
        lng -> Nullable<Float8>,
        customer_type -> Nullable<Text>,
        customer_status -> Text,
        status_note -> Nullable<Text>,
        owner_name -> Nullable<Text>,
        owner_phone -> Nullable<Text>,
        credit_term -> Nullable<Int4>,
        vat_type -> Nullable<Text>,
        notes -> Nullable<Text>,
        assigned_to -> Array<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    contact_persons (id) {
        id -> Uuid,
        location_id -> Uuid,
        name -> Text,
        role -> Text,
        phone -> Text,
        line_id -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}
