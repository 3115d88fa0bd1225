// Copyright (c) Microsoft Corporation.

use std::fmt::Display;

/// Represents a single attempt in a retry operation.
///
/// This struct tracks the current attempt index, and it provides methods to check if this is the
/// first or last attempt.
///
/// The default attempt has:
/// - `attempt`: 0 (first attempt, 0-based indexing)
/// - `is_last`: true (indicating this is both the first and last attempt)
///
/// This represents a single-shot operation with no retries, where the first
/// attempt is also the final attempt.
///
/// # Examples
///
/// ```
/// use seatbelt::Attempt;
///
/// // Create the first attempt (attempt 0)
/// let attempt = Attempt::new(0, false);
/// assert!(attempt.is_first());
/// assert!(!attempt.is_last());
/// assert_eq!(attempt.index(), 0);
///
/// // Create the last attempt (attempt 2)
/// let last_attempt = Attempt::new(2, true);
/// assert!(!last_attempt.is_first());
/// assert!(last_attempt.is_last());
/// assert_eq!(last_attempt.index(), 2);
///
/// // Use the default attempt (single-shot operation)
/// let default_attempt = Attempt::default();
/// assert_eq!(default_attempt.index(), 0);
/// assert!(default_attempt.is_first());
/// assert!(default_attempt.is_last());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    index: u32,
    is_last: bool,
}

impl Default for Attempt {
    fn default() -> Self {
        Self::new(0, true)
    }
}

impl Attempt {
    /// Creates a new attempt with the given attempt index and maximum attempts.
    ///
    /// # Examples
    ///
    /// ```
    /// use seatbelt::Attempt;
    ///
    /// let attempt = Attempt::new(0, false);
    /// assert_eq!(attempt.index(), 0);
    /// ```
    #[must_use]
    pub fn new(index: u32, is_last: bool) -> Self {
        Self { index, is_last }
    }

    /// Returns true if this is the first attempt (attempt 0).
    ///
    /// # Examples
    ///
    /// ```
    /// use seatbelt::Attempt;
    ///
    /// let first_attempt = Attempt::new(0, false);
    /// assert!(first_attempt.is_first());
    ///
    /// let second_attempt = Attempt::new(1, false);
    /// assert!(!second_attempt.is_first());
    /// ```
    #[must_use]
    pub fn is_first(self) -> bool {
        self.index == 0
    }

    /// Returns true if this is the last allowed attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// use seatbelt::Attempt;
    ///
    /// let not_last = Attempt::new(1, false);
    /// assert!(!not_last.is_last());
    ///
    /// let last = Attempt::new(1, true);
    /// assert!(last.is_last());
    /// ```
    #[must_use]
    pub fn is_last(self) -> bool {
        self.is_last
    }

    /// Returns the current attempt index (0-based).
    ///
    /// # Examples
    ///
    /// ```
    /// use seatbelt::Attempt;
    ///
    /// let attempt = Attempt::new(3, false);
    /// assert_eq!(attempt.index(), 3);
    /// ```
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }

    #[cfg_attr(test, mutants::skip)] // causes test timeouts
    #[cfg(any(feature = "retry", test))]
    pub(crate) fn increment(self, max_attempts: MaxAttempts) -> Option<Self> {
        let next = self.index.saturating_add(1);

        match max_attempts {
            MaxAttempts::Finite(index) => {
                // If we've reached or exceeded the maximum number of attempts, return None.
                if next >= index {
                    return None;
                }

                let is_last = next == index.saturating_sub(1);
                Some(Self::new(next, is_last))
            }
            MaxAttempts::Infinite => Some(Self::new(next, false)),
        }
    }
}

impl Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.index.fmt(f)
    }
}

/// Represents the maximum number of retry attempts allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg(any(feature = "retry", test))]
#[non_exhaustive]
pub(crate) enum MaxAttempts {
    /// A finite number of retry attempts.
    Finite(u32),

    /// An infinite number of retry attempts.
    #[cfg(any(feature = "retry", test))] // currently, only used with retry feature
    Infinite,
}

#[cfg(any(feature = "retry", test))]
impl MaxAttempts {
    #[cfg(any(feature = "retry", test))]
    pub fn first_attempt(self) -> Attempt {
        Attempt::new(0, matches!(self, Self::Finite(1)))
    }
}

#[cfg(any(feature = "retry", test))]
impl From<u32> for MaxAttempts {
    fn from(value: u32) -> Self {
        Self::Finite(value)
    }
}
