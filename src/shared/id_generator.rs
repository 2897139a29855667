use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Source of request IDs attached to every device call (`x-request-id`)
pub trait IdGenerator: Send + Sync {
    /// New request ID, hyphenated lowercase UUID v4
    fn request_id(&self) -> String;
}

/// Production implementation of IdGenerator using random UUID generation
#[derive(Debug, Clone, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn request_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Returns a fixed list of IDs in order, wrapping around when exhausted
#[derive(Debug, Clone)]
pub struct FixedIdGenerator {
    ids: Arc<Vec<String>>,
    next: Arc<AtomicUsize>,
}

impl FixedIdGenerator {
    pub fn from_strings(ids: &[&str]) -> Self {
        let ids: Vec<String> = if ids.is_empty() {
            vec![Uuid::nil().to_string()]
        } else {
            ids.iter().map(|s| s.to_string()).collect()
        };
        Self {
            ids: Arc::new(ids),
            next: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always returns `id`
    pub fn single(id: &str) -> Self {
        Self::from_strings(&[id])
    }

    /// Number of IDs handed out so far
    pub fn issued(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

impl IdGenerator for FixedIdGenerator {
    fn request_id(&self) -> String {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.ids[index % self.ids.len()].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_generator() {
        let generator = RandomIdGenerator::new();

        let id1 = generator.request_id();
        let id2 = generator.request_id();

        let uuid = Uuid::parse_str(&id1).unwrap();
        assert_eq!(uuid.get_version_num(), 4);
        assert_ne!(id1, id2);

        // Lowercase with hyphens
        assert_eq!(id1.len(), 36);
        assert!(id1
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }

    #[test]
    fn test_fixed_id_generator_sequence_wraps() {
        let generator = FixedIdGenerator::from_strings(&[
            "550e8400-e29b-41d4-a716-446655440000",
            "7c9e6679-7425-40de-944b-e07fc1f90ae7",
        ]);

        assert_eq!(generator.request_id(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(generator.request_id(), "7c9e6679-7425-40de-944b-e07fc1f90ae7");
        assert_eq!(generator.request_id(), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(generator.issued(), 3);
    }

    #[test]
    fn test_fixed_id_generator_empty_list_yields_nil() {
        let generator = FixedIdGenerator::from_strings(&[]);
        assert_eq!(generator.request_id(), Uuid::nil().to_string());
    }

    #[test]
    fn test_fixed_id_generator_clones_share_counter() {
        let generator = FixedIdGenerator::single("550e8400-e29b-41d4-a716-446655440000");
        let clone = generator.clone();

        clone.request_id();
        clone.request_id();

        assert_eq!(generator.issued(), 2);
    }

    #[test]
    fn test_id_generator_trait_object() {
        let random: Box<dyn IdGenerator> = Box::new(RandomIdGenerator::new());
        let fixed: Box<dyn IdGenerator> =
            Box::new(FixedIdGenerator::single("550e8400-e29b-41d4-a716-446655440000"));

        assert!(Uuid::parse_str(&random.request_id()).is_ok());
        assert_eq!(fixed.request_id(), "550e8400-e29b-41d4-a716-446655440000");
    }
}
