/// A single `srcset` entry
#[derive(Debug, Clone, PartialEq)]
struct Candidate<'a> {
    url: &'a str,
    descriptor: Descriptor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Descriptor {
    /// `800w`
    Width(u32),
    /// `2x`, `1.5x`; a missing descriptor means `1x`
    Density(f32),
}

/// Picks the highest-resolution URL out of a `srcset` attribute
///
/// Width descriptors win over density descriptors when both appear. When every
/// candidate is density-based, the element's existing `src` competes as an
/// implicit `1x` candidate. Unparseable entries are ignored; `None` means
/// nothing usable was found.
///
/// # Arguments
///
/// * `srcset` - Raw attribute value
/// * `src` - Current `src` attribute, if any
///
/// # Examples
///
/// ```
/// use scrapedown::html::pick_srcset_candidate;
///
/// assert_eq!(
///     pick_srcset_candidate("a.jpg 100w, b.jpg 800w", None).as_deref(),
///     Some("b.jpg")
/// );
/// assert_eq!(
///     pick_srcset_candidate("small.jpg 1x, big.jpg 2x", Some("base.jpg")).as_deref(),
///     Some("big.jpg")
/// );
/// ```
pub fn pick_srcset_candidate(srcset: &str, src: Option<&str>) -> Option<String> {
    let mut candidates: Vec<Candidate<'_>> = srcset.split(',').filter_map(parse_candidate).collect();

    let all_density = candidates
        .iter()
        .all(|c| matches!(c.descriptor, Descriptor::Density(_)));

    if all_density {
        if let Some(src) = src.map(str::trim).filter(|s| !s.is_empty()) {
            candidates.push(Candidate {
                url: src,
                descriptor: Descriptor::Density(1.0),
            });
        }
    }

    let widest = candidates
        .iter()
        .filter_map(|c| match c.descriptor {
            Descriptor::Width(w) => Some((c.url, w)),
            Descriptor::Density(_) => None,
        })
        // First candidate wins ties
        .fold(None, |best: Option<(&str, u32)>, (url, w)| match best {
            Some((_, best_w)) if best_w >= w => best,
            _ => Some((url, w)),
        });

    if let Some((url, _)) = widest {
        return Some(url.to_string());
    }

    candidates
        .iter()
        .filter_map(|c| match c.descriptor {
            Descriptor::Density(d) => Some((c.url, d)),
            Descriptor::Width(_) => None,
        })
        .fold(None, |best: Option<(&str, f32)>, (url, d)| match best {
            Some((_, best_d)) if best_d >= d => best,
            _ => Some((url, d)),
        })
        .map(|(url, _)| url.to_string())
}

fn parse_candidate(entry: &str) -> Option<Candidate<'_>> {
    let mut parts = entry.split_whitespace();
    let url = parts.next()?;

    let descriptor = match parts.next() {
        None => Descriptor::Density(1.0),
        Some(raw) => {
            if let Some(width) = raw.strip_suffix('w') {
                Descriptor::Width(width.parse().ok()?)
            } else if let Some(density) = raw.strip_suffix('x') {
                let density: f32 = density.parse().ok()?;
                if !density.is_finite() || density <= 0.0 {
                    return None;
                }
                Descriptor::Density(density)
            } else {
                return None;
            }
        }
    };

    Some(Candidate { url, descriptor })
}
