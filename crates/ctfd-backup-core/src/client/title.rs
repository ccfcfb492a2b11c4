//! CTF name detection from the home page `<title>`.

const TITLE_SUFFIX: &str = " - CTFd";
const HOSTILE: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Extracts the text of the first `<title>` element, drops the ` - CTFd`
/// suffix and replaces characters that cannot appear in a directory name.
pub(crate) fn ctf_name_from_html(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let content_start = open + lower[open..].find('>')? + 1;
    let content_len = lower[content_start..].find("</title")?;
    let raw = html[content_start..content_start + content_len].trim();

    let name: String = raw
        .replace(TITLE_SUFFIX, "")
        .trim()
        .chars()
        .map(|c| if HOSTILE.contains(&c) { '_' } else { c })
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
