
/// Extensions played as video. Everything else is treated as a still image.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::Image
        }
    }

    pub fn from_filename(filename: &str) -> Self {
        Self::from_extension(extension_of(filename))
    }

    pub fn is_video(self) -> bool {
        self == Self::Video
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// Text after the last dot, or an empty string for names without one.
pub fn extension_of(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}

/// Separator used by a folder string: `\` if it occurs anywhere, `/` otherwise.
pub fn separator_for(folder: &str) -> char {
    if folder.contains('\\') {
        '\\'
    } else {
        '/'
    }
}

/// Joins a source folder and a queue filename using the folder's own separator.
pub fn join_path(folder: &str, filename: &str) -> String {
    let sep = separator_for(folder);
    if folder.ends_with(sep) {
        format!("{folder}{filename}")
    } else {
        format!("{folder}{sep}{filename}")
    }
}

/// A single queue entry resolved against its source folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub filename: String,
    pub full_path: String,
    pub kind: MediaKind,
}

impl MediaItem {
    pub fn resolve(folder: &str, filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            full_path: join_path(folder, filename),
            kind: MediaKind::from_filename(filename),
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind.is_video()
    }
}

pub fn mime_for(filename: &str) -> &'static str {
    match extension_of(filename).to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "jpg" | "jpeg" => "image/jpeg",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}
