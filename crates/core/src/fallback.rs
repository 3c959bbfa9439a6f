//! Deterministic fallback content for products whose description or image
//! could not be generated.
//!
//! The generation service can fail for many reasons (timeout, quota,
//! network); enrichment always degrades to the content here rather than
//! surfacing the failure. Selection is keyed on a stable hash of the
//! product name so the same name always yields the same copy.

/// Candidate fallback descriptions. `{name}` callsites interpolate the
/// product name into whichever template the name hashes to.
const DESCRIPTION_TEMPLATES: [&str; 3] = [
    "Discover the amazing {name} - a premium quality product designed to enhance \
     your daily life. Built with superior craftsmanship and innovative technology, \
     this exceptional item offers unmatched performance and reliability.",
    "Experience excellence with the {name}. This thoughtfully designed product \
     features cutting-edge technology and premium materials, ensuring durability \
     and superior performance wherever you use it.",
    "The {name} represents the perfect blend of innovation and practicality. \
     Crafted with attention to detail, this outstanding product delivers \
     exceptional value and performance for discerning customers.",
];

/// Base URL of the placeholder image service.
const PLACEHOLDER_IMAGE_BASE: &str = "https://via.placeholder.com/400x400/4F46E5/ffffff";

/// Fallback description for a product, selected deterministically from a
/// fixed set of templates by a stable hash of the name.
pub fn fallback_description(name: &str) -> String {
    let idx = fnv1a(name.as_bytes()) as usize % DESCRIPTION_TEMPLATES.len();
    DESCRIPTION_TEMPLATES[idx].replace("{name}", name)
}

/// Fallback image reference: a placeholder image URL labelled with the
/// product name.
pub fn fallback_image_url(name: &str) -> String {
    format!("{PLACEHOLDER_IMAGE_BASE}?text={}", percent_encode(name))
}

/// FNV-1a 64-bit hash. Stable across runs and platforms, which is all the
/// template selection needs.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(PRIME)
    })
}

/// Percent-encode a string for use in a URL query value. Everything
/// outside the RFC 3986 unreserved set is encoded; spaces become `%20`.
pub fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_contains_name() {
        let desc = fallback_description("Walnut Desk");
        assert!(desc.contains("Walnut Desk"));
    }

    #[test]
    fn test_description_deterministic() {
        assert_eq!(
            fallback_description("Oak Chair"),
            fallback_description("Oak Chair")
        );
    }

    #[test]
    fn test_description_varies_by_name() {
        // Not guaranteed for every pair, but these names hash to
        // different templates; pins the selection logic.
        let a = fallback_description("a");
        let b = fallback_description("b");
        let c = fallback_description("c");
        assert!(a != b || b != c);
    }

    #[test]
    fn test_image_url_encodes_name() {
        let url = fallback_image_url("Oak Chair & Stool");
        assert_eq!(
            url,
            "https://via.placeholder.com/400x400/4F46E5/ffffff?text=Oak%20Chair%20%26%20Stool"
        );
    }

    #[test]
    fn test_percent_encode_unreserved_passthrough() {
        assert_eq!(percent_encode("Azaz09-._~"), "Azaz09-._~");
    }

    #[test]
    fn test_percent_encode_utf8() {
        assert_eq!(percent_encode("café"), "caf%C3%A9");
    }
}
