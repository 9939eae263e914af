diesel::table! {
    vdm_videos (id) {
        id -> Int8,
        video_id -> Text,
        title -> Text,
        url -> Text,
        published_at -> Timestamptz,
        caption -> Text,
        created_at -> Timestamptz,
    }
}
