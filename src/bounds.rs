/// Limits on a numeric magnitude: a number's value, or the size of a string,
/// array or record.
///
/// `min`/`max` are inclusive, `xmin`/`xmax` exclusive. When both members of a
/// family are set, the exclusive one wins. `exact` overrides everything else.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub xmin: Option<f64>,
    pub max: Option<f64>,
    pub xmax: Option<f64>,
    pub exact: Option<f64>,
}

impl Bounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exactly(exact: f64) -> Self {
        Self {
            exact: Some(exact),
            ..Self::default()
        }
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_xmin(mut self, xmin: f64) -> Self {
        self.xmin = Some(xmin);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_xmax(mut self, xmax: f64) -> Self {
        self.xmax = Some(xmax);
        self
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_lower(&self) -> bool {
        self.min.is_some() || self.xmin.is_some()
    }

    pub fn has_upper(&self) -> bool {
        self.max.is_some() || self.xmax.is_some()
    }

    /// Checks `magnitude` against these bounds, returning a description of the
    /// violation (e.g. `"length must be at least 3"`) or `None` if it fits.
    pub fn check(&self, magnitude: f64, label: &str) -> Option<String> {
        if let Some(exact) = self.exact {
            if magnitude == exact {
                return None;
            }

            return Some(format!("{} must be exactly {}", label, exact));
        }

        let mut clauses = Vec::with_capacity(2);

        if let Some(xmin) = self.xmin {
            if magnitude <= xmin {
                clauses.push(format!("greater than {}", xmin));
            }
        } else if let Some(min) = self.min {
            if magnitude < min {
                clauses.push(format!("at least {}", min));
            }
        }

        if let Some(xmax) = self.xmax {
            if magnitude >= xmax {
                clauses.push(format!("less than {}", xmax));
            }
        } else if let Some(max) = self.max {
            if magnitude > max {
                clauses.push(format!("at most {}", max));
            }
        }

        if clauses.is_empty() {
            None
        } else {
            Some(format!("{} must be {}", label, clauses.join(" and ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Bounds;
    use rstest::rstest;

    #[rstest]
    #[case(Bounds::new().with_min(10.0), 10.0, true)]
    #[case(Bounds::new().with_min(10.0), 9.0, false)]
    #[case(Bounds::new().with_xmin(10.0), 10.0, false)]
    #[case(Bounds::new().with_xmin(10.0), 11.0, true)]
    #[case(Bounds::new().with_max(20.0), 20.0, true)]
    #[case(Bounds::new().with_max(20.0), 20.5, false)]
    #[case(Bounds::new().with_xmax(20.0), 20.0, false)]
    #[case(Bounds::new().with_xmax(20.0), 19.9, true)]
    #[case(Bounds::new().with_min(-10.0).with_xmax(20.0), -10.0, true)]
    #[case(Bounds::new(), f64::MAX, true)]
    fn inclusive_and_exclusive_edges(
        #[case] bounds: Bounds,
        #[case] magnitude: f64,
        #[case] ok: bool,
    ) {
        assert_eq!(ok, bounds.check(magnitude, "value").is_none());
    }

    #[test]
    fn exclusive_takes_precedence() {
        let bounds = Bounds::new().with_min(10.0).with_xmin(10.0);
        assert!(bounds.check(10.0, "value").is_some());

        let bounds = Bounds::new().with_max(5.0).with_xmax(5.0);
        assert!(bounds.check(5.0, "value").is_some());
    }

    #[test]
    fn exact_overrides_bounds() {
        let mut bounds = Bounds::exactly(3.0).with_min(10.0).with_xmax(2.0);
        assert_eq!(None, bounds.check(3.0, "length"));
        assert_eq!(
            Some("length must be exactly 3".to_owned()),
            bounds.check(10.0, "length")
        );

        bounds.exact = None;
        assert!(bounds.check(3.0, "length").is_some());
    }

    #[test]
    fn messages() {
        let bounds = Bounds::new().with_min(1.0).with_xmax(4.5);
        assert_eq!(
            Some("length must be at least 1".to_owned()),
            bounds.check(0.0, "length")
        );
        assert_eq!(
            Some("value must be less than 4.5".to_owned()),
            bounds.check(7.0, "value")
        );

        // Contradictory bounds report both clauses.
        let bounds = Bounds::new().with_xmin(5.0).with_max(1.0);
        assert_eq!(
            Some("value must be greater than 5 and at most 1".to_owned()),
            bounds.check(3.0, "value")
        );
    }
}
