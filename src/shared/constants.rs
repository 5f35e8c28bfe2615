/// Stored in place of a description when the provider call fails
pub const FALLBACK_DESCRIPTION: &str = "AI description not available";

/// Instruction sent to the description provider along with every photo
pub const DESCRIPTION_PROMPT: &str =
    "Waste is detect or not detected (ex in the image there is no any waste is detected)in one line.";

/// MIME type assumed for photo parts that do not declare one
pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Name used when a client filename sanitizes to nothing
pub const DEFAULT_UPLOAD_NAME: &str = "upload";

/// URL prefix under which stored photos are served
pub const UPLOADS_ROUTE: &str = "/uploads";

// =============================================================================
// API MESSAGES
// =============================================================================

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Upload successful!";

pub const DELETE_SUCCESS_MESSAGE: &str = "Post deleted successfully.";
