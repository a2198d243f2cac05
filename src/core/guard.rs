use crate::error::ReviewError;

/// Rejects diffs longer than `max_size` characters.
pub fn check_size(diff: &str, max_size: usize) -> Result<(), ReviewError> {
    let actual = diff.chars().count();
    if actual > max_size {
        return Err(ReviewError::DiffTooLarge {
            actual,
            max: max_size,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_diff_exactly_at_limit() {
        let diff = "a".repeat(10_000);
        assert!(check_size(&diff, 10_000).is_ok());
    }

    #[test]
    fn rejects_one_past_limit() {
        let diff = "a".repeat(10_001);
        match check_size(&diff, 10_000) {
            Err(ReviewError::DiffTooLarge { actual, max }) => {
                assert_eq!(actual, 10_001);
                assert_eq!(max, 10_000);
            }
            other => panic!("expected DiffTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn empty_diff_is_fine() {
        assert!(check_size("", 1).is_ok());
    }

    #[test]
    fn counts_characters_not_bytes() {
        // three characters, nine bytes
        let diff = "日本語";
        assert!(check_size(diff, 3).is_ok());
        assert!(check_size(diff, 2).is_err());
    }
}
