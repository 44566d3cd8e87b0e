use crate::error::ReportError;
use worker::*;

/// Public path prefix under which uploaded images are served.
pub const UPLOADS_PATH: &str = "/uploads/";
/// R2 key prefix for uploaded images.
const UPLOADS_KEY_PREFIX: &str = "uploads/";

/// Collision-free name for an upload: `<epoch ms>-<random below 1e9>`
/// followed by the original file's extension, if it had one.
pub fn upload_name(original: &str, now_ms: u64, random: u32) -> String {
    let suffix = random % 1_000_000_000;
    match extension(original) {
        Some(ext) => format!("{now_ms}-{suffix}.{ext}"),
        None => format!("{now_ms}-{suffix}"),
    }
}

fn extension(filename: &str) -> Option<&str> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Reference stored on a report or dispute for an uploaded blob.
pub fn public_path(name: &str) -> String {
    format!("{UPLOADS_PATH}{name}")
}

/// Map a requested upload name to its R2 key. Anything that could escape
/// the uploads prefix is refused.
pub fn object_key(name: &str) -> Option<String> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return None;
    }
    Some(format!("{UPLOADS_KEY_PREFIX}{name}"))
}

/// A file input left empty still arrives as a zero-byte part.
pub fn has_content(size: usize) -> bool {
    size > 0
}

/// Uploads up to and including `max_bytes` are accepted.
pub fn check_upload_size(size: u64, max_bytes: u64) -> std::result::Result<(), ReportError> {
    if size > max_bytes {
        return Err(ReportError::UploadTooLarge {
            limit_bytes: max_bytes,
        });
    }
    Ok(())
}

/// Store an uploaded image in R2 and return its public path.
pub async fn store_upload(
    bucket: &Bucket,
    file: &File,
    max_bytes: u64,
    now_ms: u64,
) -> std::result::Result<String, ReportError> {
    check_upload_size(file.size() as u64, max_bytes)?;

    let name = upload_name(&file.name(), now_ms, random_u32()?);
    let key = UPLOADS_KEY_PREFIX.to_string() + &name;
    let data = file.bytes().await?;
    let content_type = file.type_();

    let mut put = bucket.put(&key, data);
    if !content_type.is_empty() {
        put = put.http_metadata(HttpMetadata {
            content_type: Some(content_type),
            ..Default::default()
        });
    }
    put.execute().await?;

    Ok(public_path(&name))
}

/// Retrieve a blob and its content type from R2. Returns None if not found.
pub async fn get_blob(bucket: &Bucket, key: &str) -> Result<Option<(Vec<u8>, Option<String>)>> {
    let obj = bucket.get(key).execute().await?;
    match obj {
        Some(obj) => {
            let content_type = obj.http_metadata().content_type;
            let bytes = match obj.body() {
                Some(body) => body.bytes().await?,
                None => Vec::new(),
            };
            Ok(Some((bytes, content_type)))
        }
        None => Ok(None),
    }
}

fn random_u32() -> std::result::Result<u32, ReportError> {
    let mut buf = [0u8; 4];
    getrandom::getrandom(&mut buf)
        .map_err(|err| ReportError::Storage(format!("failed to generate upload name: {err}")))?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_name_keeps_extension() {
        assert_eq!(upload_name("pile.jpg", 1700000000123, 42), "1700000000123-42.jpg");
        assert_eq!(upload_name("IMG_0001.HEIC", 5, 7), "5-7.HEIC");
        assert_eq!(upload_name("archive.tar.gz", 5, 7), "5-7.gz");
    }

    #[test]
    fn upload_name_without_extension() {
        assert_eq!(upload_name("photo", 5, 7), "5-7");
        assert_eq!(upload_name(".hidden", 5, 7), "5-7");
        assert_eq!(upload_name("trailing.", 5, 7), "5-7");
        assert_eq!(upload_name("", 5, 7), "5-7");
    }

    #[test]
    fn upload_name_ignores_client_directories() {
        assert_eq!(upload_name("C:\\Users\\me\\pile.png", 5, 7), "5-7.png");
        assert_eq!(upload_name("dir.d/photo", 5, 7), "5-7");
    }

    #[test]
    fn upload_suffix_stays_below_one_billion() {
        assert_eq!(upload_name("a.jpg", 1, u32::MAX), "1-294967295.jpg");
    }

    #[test]
    fn public_path_format() {
        assert_eq!(public_path("1-2.jpg"), "/uploads/1-2.jpg");
    }

    #[test]
    fn object_key_accepts_plain_names() {
        assert_eq!(object_key("1-2.jpg").as_deref(), Some("uploads/1-2.jpg"));
    }

    #[test]
    fn object_key_rejects_traversal() {
        assert_eq!(object_key(""), None);
        assert_eq!(object_key("../secrets"), None);
        assert_eq!(object_key("a/b.jpg"), None);
        assert_eq!(object_key("a\\b.jpg"), None);
    }

    #[test]
    fn upload_at_limit_is_accepted() {
        assert_eq!(check_upload_size(1024, 1024), Ok(()));
        assert_eq!(check_upload_size(0, 1024), Ok(()));
    }

    #[test]
    fn upload_over_limit_is_rejected() {
        let err = check_upload_size(1025, 1024).unwrap_err();
        assert_eq!(err, ReportError::UploadTooLarge { limit_bytes: 1024 });
        assert_eq!(err.status_code(), 413);
    }

    #[test]
    fn zero_byte_part_is_not_an_image() {
        assert!(!has_content(0));
        assert!(has_content(1));
    }
}
