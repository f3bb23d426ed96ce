use crate::api::ClassifyResponse;
use crate::model::{Category, ClassificationResult, ClassificationSource, Priority};

/// Keyword groups checked in order; the first group with a hit wins.
const KEYWORDS: [(Category, &[&str]); 4] = [
    (Category::Medicine, &["medicine", "pill", "drug", "prescription"]),
    (Category::BloodSamples, &["blood", "sample", "specimen", "lab"]),
    (Category::Documents, &["document", "paper", "file", "form"]),
    (Category::LinenSupplies, &["linen", "cloth", "supply", "fabric"]),
];

/// Deterministic keyword classifier used whenever the remote service cannot
/// give an answer. Plain substring matching on the lowercased text.
pub fn fallback_classify(description: &str) -> ClassificationResult {
    let lower = description.to_lowercase();
    let category = KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(c, _)| *c)
        .unwrap_or(Category::Others);

    ClassificationResult {
        category,
        priority: category.priority(),
        source: ClassificationSource::Fallback,
    }
}

/// Turn a service reply into a result. `None` means the reply is unusable
/// (no category, or a label outside the fixed set) and the caller should fall
/// back.
pub fn interpret_service_reply(reply: &ClassifyResponse) -> Option<ClassificationResult> {
    let category: Category = reply.category.as_deref()?.parse().ok()?;
    let priority = reply
        .priority
        .and_then(|p| Priority::new(p).ok())
        .unwrap_or_else(|| category.priority());

    Some(ClassificationResult {
        category,
        priority,
        source: ClassificationSource::Service,
    })
}
