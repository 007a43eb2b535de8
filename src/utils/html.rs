// src/utils/html.rs

/// Clean admin-authored text using the ammonia library.
///
/// Safe formatting tags (like <b>, <em>) survive; <script>, <iframe> and
/// event-handler attributes are stripped. Question text and option labels go
/// through this before they are stored.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
