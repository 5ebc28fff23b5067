//! Coalescing of short pages into model-sized chunks.

/// Pages whose trimmed text is shorter than this many characters are folded
/// into the preceding chunk.
pub const MERGE_THRESHOLD: usize = 1000;

/// Merge consecutive short pages into the chunk before them.
///
/// A page is short when its whitespace-trimmed length (in characters) is below
/// `threshold`. The first page always opens a chunk, even when short, since
/// there is nothing before it to merge into. Short pages are held back and
/// appended newline-joined to the latest chunk when the next long page
/// arrives, or at end of input.
pub fn merge_pages<S: AsRef<str>>(pages: &[S], threshold: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for page in pages {
        let text = page.as_ref();
        if is_short(text, threshold) && !chunks.is_empty() {
            pending.push(text);
            continue;
        }
        flush(&mut chunks, &mut pending);
        chunks.push(text.to_string());
    }
    flush(&mut chunks, &mut pending);

    chunks
}

fn is_short(text: &str, threshold: usize) -> bool {
    text.trim().chars().count() < threshold
}

fn flush(chunks: &mut [String], pending: &mut Vec<&str>) {
    if pending.is_empty() {
        return;
    }
    if let Some(last) = chunks.last_mut() {
        last.push('\n');
        last.push_str(&pending.join("\n"));
    }
    pending.clear();
}
