//! Built-in parameter table
//!
//! Used when the configuration file does not declare `[[parameters]]`.

use super::{ParamSpec, ParameterSchema};

impl ParameterSchema {
    /// The five-parameter demo table
    ///
    /// | Name  | Type  | Settable |
    /// |-------|-------|----------|
    /// | Alpha | float | no       |
    /// | Beta  | float | no       |
    /// | Gamma | float | yes      |
    /// | Delta | float | no       |
    /// | Zeta  | float | yes      |
    ///
    /// ```rust
    /// # use parmsync_common::params::ParameterSchema;
    /// let schema = ParameterSchema::default_parameters();
    /// assert_eq!(schema.len(), 5);
    /// assert!(schema.get("Gamma").unwrap().settable);
    /// assert!(!schema.get("Alpha").unwrap().settable);
    /// ```
    pub fn default_parameters() -> Self {
        let params = vec![
            ParamSpec::read_only("Alpha"),
            ParamSpec::read_only("Beta"),
            ParamSpec::settable("Gamma"),
            ParamSpec::read_only("Delta"),
            ParamSpec::settable("Zeta"),
        ];
        // Names above are distinct and non-empty, so no validation pass
        let index = params
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name.clone(), i))
            .collect();

        Self { params, index }
    }
}
