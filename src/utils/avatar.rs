use uuid::Uuid;

pub const ALLOWED_AVATAR_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Lower-cased extension of an uploaded file name, if it is an allowed image type.
pub fn avatar_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    ALLOWED_AVATAR_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

/// Object path of a user's avatar. One object per user, overwritten on re-upload.
pub fn avatar_object_path(user_id: Uuid, extension: &str) -> String {
    format!("avatars/{}.{}", user_id, extension)
}

pub fn guess_content_type(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
