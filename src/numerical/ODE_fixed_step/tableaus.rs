//! Butcher tableaus of the explicit fixed-step schemes.
//!
//! Stage `s` is evaluated at `x + c_s·h` with the state
//! `y + scale_s(h)·Σ_j a_sj·k_j`, the step is `y + scale(h)·Σ_j w_j·k_j`.
//! Coefficients are stored as integer numerators with a common scale per row, so the
//! arithmetic follows the textbook form of each scheme term by term.

/// multiplier applied to the weighted sum of slopes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepScale {
    /// `h·c`
    Times(f64),
    /// `h/d`
    Over(f64),
}

impl StepScale {
    pub fn of(&self, h: f64) -> f64 {
        match self {
            StepScale::Times(c) => h * c,
            StepScale::Over(d) => h / d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    /// node `c_s`, fraction of the step
    pub node: f64,
    pub scale: StepScale,
    /// `a_sj` for `j < s`; empty for the first stage
    pub coefficients: &'static [f64],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplicitTableau {
    pub name: &'static str,
    pub order: usize,
    pub stages: &'static [Stage],
    pub weights_scale: StepScale,
    pub weights: &'static [f64],
}

impl ExplicitTableau {
    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }
}

const FIRST: Stage = Stage {
    node: 0.0,
    scale: StepScale::Times(1.0),
    coefficients: &[],
};

pub const EULER: ExplicitTableau = ExplicitTableau {
    name: "EULER",
    order: 1,
    stages: &[FIRST],
    weights_scale: StepScale::Times(1.0),
    weights: &[1.0],
};

pub const MIDPOINT: ExplicitTableau = ExplicitTableau {
    name: "MIDPOINT",
    order: 2,
    stages: &[
        FIRST,
        Stage {
            node: 0.5,
            scale: StepScale::Over(2.0),
            coefficients: &[1.0],
        },
    ],
    weights_scale: StepScale::Times(1.0),
    weights: &[0.0, 1.0],
};

/// Heun: slope at the start averaged with the slope at the Euler predicted end point
pub const MODIFIED_EULER: ExplicitTableau = ExplicitTableau {
    name: "MODIFIED EULER",
    order: 2,
    stages: &[
        FIRST,
        Stage {
            node: 1.0,
            scale: StepScale::Times(1.0),
            coefficients: &[1.0],
        },
    ],
    weights_scale: StepScale::Times(1.0),
    weights: &[0.5, 0.5],
};

pub const RK4: ExplicitTableau = ExplicitTableau {
    name: "RUNGE-KUTTA 4",
    order: 4,
    stages: &[
        FIRST,
        Stage {
            node: 0.5,
            scale: StepScale::Over(2.0),
            coefficients: &[1.0],
        },
        Stage {
            node: 0.5,
            scale: StepScale::Over(2.0),
            coefficients: &[0.0, 1.0],
        },
        Stage {
            node: 1.0,
            scale: StepScale::Times(1.0),
            coefficients: &[0.0, 0.0, 1.0],
        },
    ],
    weights_scale: StepScale::Times(1.0 / 6.0),
    weights: &[1.0, 2.0, 2.0, 1.0],
};

/// Ten stage scheme with fixed coefficients. Row 8 does not sum to its node;
/// its slope `k8` only enters through stages 9 and 10.
pub const RK8: ExplicitTableau = ExplicitTableau {
    name: "RUNGE-KUTTA 8",
    order: 8,
    stages: &[
        FIRST,
        Stage {
            node: 4.0 / 27.0,
            scale: StepScale::Times(4.0 / 27.0),
            coefficients: &[1.0],
        },
        Stage {
            node: 2.0 / 9.0,
            scale: StepScale::Over(18.0),
            coefficients: &[1.0, 3.0],
        },
        Stage {
            node: 1.0 / 3.0,
            scale: StepScale::Over(12.0),
            coefficients: &[1.0, 0.0, 3.0],
        },
        Stage {
            node: 1.0 / 2.0,
            scale: StepScale::Over(8.0),
            coefficients: &[1.0, 0.0, 0.0, 3.0],
        },
        Stage {
            node: 2.0 / 3.0,
            scale: StepScale::Over(54.0),
            coefficients: &[13.0, 0.0, -27.0, 42.0, 8.0],
        },
        Stage {
            node: 1.0 / 6.0,
            scale: StepScale::Over(4320.0),
            coefficients: &[389.0, 0.0, -54.0, 966.0, -824.0, 243.0],
        },
        Stage {
            node: 1.0,
            scale: StepScale::Over(20.0),
            coefficients: &[-234.0, 0.0, 81.0, -1164.0, 656.0, -122.0, 800.0],
        },
        Stage {
            node: 5.0 / 6.0,
            scale: StepScale::Over(288.0),
            coefficients: &[-127.0, 0.0, 18.0, -678.0, 456.0, -9.0, 576.0, 4.0],
        },
        Stage {
            node: 1.0,
            scale: StepScale::Over(820.0),
            coefficients: &[
                1481.0, 0.0, -81.0, 7104.0, -3376.0, 72.0, -5040.0, -60.0, 720.0,
            ],
        },
    ],
    weights_scale: StepScale::Over(840.0),
    weights: &[41.0, 0.0, 0.0, 27.0, 272.0, 27.0, 216.0, 0.0, 216.0, 41.0],
};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [ExplicitTableau; 5] = [EULER, MIDPOINT, MODIFIED_EULER, RK4, RK8];

    #[test]
    fn test_tableaus_are_explicit() {
        for tableau in ALL {
            assert_eq!(tableau.weights.len(), tableau.n_stages(), "{}", tableau.name);
            for (s, stage) in tableau.stages.iter().enumerate() {
                assert_eq!(stage.coefficients.len(), s, "{} stage {}", tableau.name, s + 1);
            }
        }
    }

    #[test]
    fn test_weights_are_consistent() {
        for tableau in ALL {
            let total: f64 = tableau.weights.iter().sum();
            assert_relative_eq!(tableau.weights_scale.of(total), 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_rows_sum_to_nodes() {
        for tableau in ALL {
            for (s, stage) in tableau.stages.iter().enumerate().skip(1) {
                if tableau.name == RK8.name && s == 7 {
                    continue;
                }
                let row: f64 = stage.coefficients.iter().sum();
                assert_relative_eq!(stage.scale.of(row), stage.node, epsilon = 1e-15);
            }
        }
        let row8: f64 = RK8.stages[7].coefficients.iter().sum();
        assert_relative_eq!(RK8.stages[7].scale.of(row8), 17.0 / 20.0, epsilon = 1e-15);
    }

    #[test]
    fn test_step_scale() {
        assert_eq!(StepScale::Over(2.0).of(0.3), 0.15);
        assert_eq!(StepScale::Times(1.0).of(0.3), 0.3);
    }
}
