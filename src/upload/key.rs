//! Object keys for cloud storage uploads.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::transport::file::extension_for_mime;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 11;
const KEY_PREFIX: &str = "images";

/// `images/<ms epoch>_<random base36>.<ext>` for a file of type `mime`.
pub fn object_key(mime: Option<&str>) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    object_key_at(now, &random_suffix(&mut rand::thread_rng()), mime)
}

pub fn object_key_at(millis: u64, suffix: &str, mime: Option<&str>) -> String {
    let ext = mime.map(extension_for_mime).unwrap_or("jpg");
    format!("{}/{}_{}.{}", KEY_PREFIX, millis, suffix, ext)
}

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
