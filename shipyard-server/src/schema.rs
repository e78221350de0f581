//! Diesel schema definitions for Shipyard server.

diesel::table! {
    ships (id) {
        id -> Int8,
        #[max_length = 50]
        name -> Varchar,
        #[max_length = 50]
        planet -> Varchar,
        ship_type -> Text,
        prod_date -> Timestamp,
        is_used -> Bool,
        speed -> Float8,
        crew_size -> Int4,
        rating -> Float8,
    }
}
