/// Mints the names of the indicators which the [`Explainer`](crate::Explainer) introduces into its
/// oracle.
///
/// The counter is never reset, so every name handed out through one explainer is unique.
#[derive(Debug, Clone)]
pub(crate) struct IndicatorNames {
    prefix: String,
    next_id: u64,
}

impl IndicatorNames {
    pub(crate) fn new(prefix: impl Into<String>) -> Self {
        IndicatorNames {
            prefix: prefix.into(),
            next_id: 0,
        }
    }

    pub(crate) fn next_name(&mut self) -> String {
        let name = format!("{}{}", self.prefix, self.next_id);
        self.next_id += 1;
        name
    }
}
