diesel::table! {
    use diesel::sql_types::*;

    documents (id) {
        id -> Uuid,
        name -> Text,
        media_type -> Text,
        size_bytes -> Int8,
        content_hash -> Text,
        status -> Text,
        error_message -> Nullable<Text>,
        uploaded_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    chunks (id) {
        id -> Uuid,
        document_id -> Uuid,
        chunk_index -> Int4,
        content -> Text,
        embedding -> Vector,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(chunks -> documents (document_id));

diesel::allow_tables_to_appear_in_same_query!(chunks, documents);
