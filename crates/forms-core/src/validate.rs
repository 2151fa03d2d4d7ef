use time::macros::format_description;

pub const PROJECT_NAME_MAX_LENGTH: usize = 100;
pub const REFLECTION_MAX_LENGTH: usize = 5000;
pub const MAX_IMAGES_PER_ENTRY: usize = 5;
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("project name is required")]
    ProjectNameRequired,
    #[error("project name must be less than {PROJECT_NAME_MAX_LENGTH} characters")]
    ProjectNameTooLong,
    #[error("reflection is required")]
    ReflectionRequired,
    #[error("reflection must be less than {REFLECTION_MAX_LENGTH} characters")]
    ReflectionTooLong,
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("file size must be less than 5MB")]
    FileTooLarge,
    #[error("only JPEG, PNG, WebP, and GIF files are allowed")]
    UnsupportedImage,
    #[error("an entry holds at most {MAX_IMAGES_PER_ENTRY} images")]
    TooManyImages,
}

/// Trimmed project name, or why it is unacceptable.
pub fn project_name(raw: &str) -> Result<&str, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::ProjectNameRequired);
    }
    if name.chars().count() > PROJECT_NAME_MAX_LENGTH {
        return Err(ValidationError::ProjectNameTooLong);
    }
    Ok(name)
}

pub fn reflection(raw: &str) -> Result<&str, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::ReflectionRequired);
    }
    if text.chars().count() > REFLECTION_MAX_LENGTH {
        return Err(ValidationError::ReflectionTooLong);
    }
    Ok(text)
}

pub fn entry_date(raw: &str) -> Result<&str, ValidationError> {
    let fmt = format_description!("[year]-[month]-[day]");
    time::Date::parse(raw, &fmt)
        .map(|_| raw)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// MIME type of an attachable image, judged by file extension.
pub fn image_file(file_name: &str, size: u64) -> Result<&'static str, ValidationError> {
    if size > MAX_FILE_SIZE {
        return Err(ValidationError::FileTooLarge);
    }
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        "gif" => Ok("image/gif"),
        _ => Err(ValidationError::UnsupportedImage),
    }
}
