use super::error::DomainError;

/// Пропускает только автора ресурса.
pub(crate) fn ensure_author(owner_id: i64, actor_id: i64) -> Result<(), DomainError> {
    if owner_id != actor_id {
        return Err(DomainError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_author;
    use crate::domain::error::DomainError;

    #[test]
    fn author_passes() {
        assert!(ensure_author(7, 7).is_ok());
    }

    #[test]
    fn stranger_is_forbidden() {
        let err = ensure_author(7, 8).expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }
}
