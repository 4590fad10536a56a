//! # Filename Sanitization
//!
//! Trasforma il nome di un'immagine in uno stem sicuro per URL e filesystem.
//! Funzione pura e deterministica, applicata in quest'ordine:
//!
//! 1. rimuove apici, virgolette (anche `’`), backtick, parentesi, `%`, `&`, `?`
//! 2. ogni sequenza di spazi o `_` diventa un singolo `-`
//! 3. rimuove tutto ciò che non è `a-z A-Z 0-9 - .`
//! 4. comprime le sequenze di `-`
//! 5. elimina i `-` iniziali e finali

use std::path::Path;

/// Extension of every converted asset
pub const OUTPUT_EXTENSION: &str = "webp";

const STRIPPED: &[char] = &['\'', '"', '\u{2019}', '`', '(', ')', '%', '&', '?'];

/// Clean a file stem for use in an output filename and URL.
///
/// The result only contains `[a-zA-Z0-9.-]`, never starts or ends with `-`
/// and has no consecutive hyphens. Applying it twice changes nothing.
pub fn sanitize_stem(stem: &str) -> String {
    let stripped = stem.chars().filter(|c| !STRIPPED.contains(c));

    let mut hyphenated = String::with_capacity(stem.len());
    let mut in_gap = false;
    for c in stripped {
        if is_space(c) || c == '_' {
            if !in_gap {
                hyphenated.push('-');
                in_gap = true;
            }
        } else {
            hyphenated.push(c);
            in_gap = false;
        }
    }

    let mut collapsed = String::with_capacity(hyphenated.len());
    for c in hyphenated
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '.')
    {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed.trim_matches('-').to_string()
}

/// Whitespace as understood by JavaScript-style `\s`: Unicode whitespace
/// plus the byte-order mark, minus NEL (U+0085).
fn is_space(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

/// Output filename (`<clean-stem>.webp`) for a source image path.
pub fn output_file_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("{}.{}", sanitize_stem(&stem), OUTPUT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_clean(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
            && !s.starts_with('-')
            && !s.ends_with('-')
            && !s.contains("--")
    }

    #[test]
    fn test_spaces_and_parentheses() {
        assert_eq!(sanitize_stem("photo one (1)"), "photo-one-1");
    }

    #[test]
    fn test_quotes_and_symbols() {
        assert_eq!(sanitize_stem("Don’t \"Panic\" 100% & more?"), "Dont-Panic-100-more");
        assert_eq!(sanitize_stem("it's `fine`"), "its-fine");
    }

    #[test]
    fn test_underscores_and_whitespace_runs() {
        assert_eq!(sanitize_stem("a__b \t _c"), "a-b-c");
        assert_eq!(sanitize_stem("__leading and trailing__"), "leading-and-trailing");
    }

    #[test]
    fn test_non_ascii_removed() {
        assert_eq!(sanitize_stem("città #1 é"), "citt-1");
        assert_eq!(sanitize_stem("写真"), "");
    }

    #[test]
    fn test_hyphen_runs_collapse_after_stripping() {
        // "-" + stripped "@" + "-" must not leave two hyphens behind
        assert_eq!(sanitize_stem("a - @ - b"), "a-b");
        assert_eq!(sanitize_stem("---x---"), "x");
    }

    #[test]
    fn test_byte_order_mark_and_nel() {
        assert_eq!(sanitize_stem("a\u{feff}b"), "a-b");
        assert_eq!(sanitize_stem("a\u{85}b"), "ab");
        assert_eq!(sanitize_stem("a\u{3000}b"), "a-b");
    }

    #[test]
    fn test_dots_are_kept() {
        assert_eq!(sanitize_stem("v1.2 final"), "v1.2-final");
    }

    #[test]
    fn test_idempotent_and_clean() {
        let samples = [
            "photo one (1)",
            "  __weird__ -- name ?? ",
            "Ärger & Co. (draft) 2024",
            "-a-",
            "",
            "...",
            "x\u{00a0}y",
            "emoji 🎉 party",
        ];
        for sample in samples {
            let once = sanitize_stem(sample);
            assert_eq!(sanitize_stem(&once), once, "not idempotent for {:?}", sample);
            assert!(is_clean(&once), "unclean output {:?} for {:?}", once, sample);
        }
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(Path::new("/in/photo one (1).JPG")), "photo-one-1.webp");
        assert_eq!(output_file_name(Path::new("/in/already.webp")), "already.webp");
        assert_eq!(output_file_name(Path::new("/in/archive.tar.png")), "archive.tar.webp");
    }
}
