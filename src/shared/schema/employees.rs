diesel::table! {
    employees (id) {
        id -> Uuid,
        name -> Text,
        email -> Text,
        phone -> Text,
        role -> Text,
        username -> Nullable<Text>,
        password_hash -> Nullable<Text>,
        avatar_url -> Nullable<Text>,
        portfolio_size -> Int4,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
