//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Lower-cased, unique.
        email -> Text,
        username -> Text,
        /// Argon2 PHC string.
        password_hash -> Text,
        full_name -> Text,
        avatar_url -> Nullable<Text>,
        is_active -> Bool,
        is_verified -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Restaurants with denormalised interaction counters.
    restaurants (id) {
        id -> Int4,
        name -> Text,
        address -> Text,
        longitude -> Float8,
        latitude -> Float8,
        price_range -> Nullable<Int2>,
        rating -> Nullable<Float8>,
        total_upvotes -> Int4,
        total_favorites -> Int4,
        total_comments -> Int4,
        average_ratings -> Float8,
        website -> Nullable<Text>,
        image_url -> Nullable<Text>,
        link -> Nullable<Text>,
        contributor_id -> Nullable<Uuid>,
        external_id -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (user, restaurant) pair.
    restaurant_user (id) {
        id -> Int8,
        user_id -> Uuid,
        restaurant_id -> Int4,
        upvoted -> Bool,
        favorited -> Bool,
        rating -> Nullable<Int2>,
        comment -> Nullable<Text>,
        visited_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shuffled restaurant order per day.
    restaurants_daily_feed (feed_date, position) {
        feed_date -> Date,
        position -> Int4,
        restaurant_id -> Int4,
    }
}

diesel::joinable!(restaurant_user -> restaurants (restaurant_id));
diesel::joinable!(restaurant_user -> users (user_id));
diesel::joinable!(restaurants -> users (contributor_id));
diesel::joinable!(restaurants_daily_feed -> restaurants (restaurant_id));

diesel::allow_tables_to_appear_in_same_query!(
    restaurant_user,
    restaurants,
    restaurants_daily_feed,
    users,
);
