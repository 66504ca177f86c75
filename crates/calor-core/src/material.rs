//! Per-cell thermal description of the simulated medium.
//!
//! [`MaterialProperties`] is what the external material loader hands to
//! the solver: a square grid of conductance weights, a binary
//! conductor/air map, the initial temperature field, and the constant
//! temperature of the cooling air. It is immutable for the whole run.

use crate::error::MaterialError;

/// Map value of an open-air cell, cooled toward the air temperature.
pub const AIR: u8 = 0;
/// Map value of a solid conductor cell.
pub const CONDUCTOR: u8 = 1;

/// Thermal parameters of a square heterogeneous medium.
///
/// All arrays are row-major with `edge_size * edge_size` elements.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialProperties {
    edge_size: usize,
    domain_params: Vec<f32>,
    domain_map: Vec<u8>,
    init_temp: Vec<f32>,
    cooler_temp: f32,
}

impl MaterialProperties {
    /// Assemble and validate a material description.
    ///
    /// Returns `Err` if the grid is empty, any array has the wrong length,
    /// a conductance is not finite and positive, a map value is not
    /// [`AIR`] or [`CONDUCTOR`], or a temperature is not finite.
    pub fn new(
        edge_size: usize,
        domain_params: Vec<f32>,
        domain_map: Vec<u8>,
        init_temp: Vec<f32>,
        cooler_temp: f32,
    ) -> Result<Self, MaterialError> {
        if edge_size == 0 {
            return Err(MaterialError::EmptyGrid);
        }
        let expected = edge_size * edge_size;
        for (array, got) in [
            ("domain_params", domain_params.len()),
            ("domain_map", domain_map.len()),
            ("init_temp", init_temp.len()),
        ] {
            if got != expected {
                return Err(MaterialError::ShapeMismatch {
                    array,
                    expected,
                    got,
                });
            }
        }
        if let Some((cell, &value)) = domain_params
            .iter()
            .enumerate()
            .find(|(_, &p)| !p.is_finite() || p <= 0.0)
        {
            return Err(MaterialError::InvalidConductance { cell, value });
        }
        if let Some((cell, &value)) = domain_map
            .iter()
            .enumerate()
            .find(|(_, &m)| m != AIR && m != CONDUCTOR)
        {
            return Err(MaterialError::InvalidMapValue { cell, value });
        }
        if let Some(cell) = init_temp.iter().position(|t| !t.is_finite()) {
            return Err(MaterialError::NonFiniteTemperature { cell: Some(cell) });
        }
        if !cooler_temp.is_finite() {
            return Err(MaterialError::NonFiniteTemperature { cell: None });
        }
        Ok(Self {
            edge_size,
            domain_params,
            domain_map,
            init_temp,
            cooler_temp,
        })
    }

    /// Edge length of the square grid.
    pub fn edge_size(&self) -> usize {
        self.edge_size
    }

    /// Total number of grid points (`edge_size²`).
    pub fn n_grid_points(&self) -> usize {
        self.edge_size * self.edge_size
    }

    /// Conductance weight of every cell.
    pub fn domain_params(&self) -> &[f32] {
        &self.domain_params
    }

    /// Conductor/air map of every cell.
    pub fn domain_map(&self) -> &[u8] {
        &self.domain_map
    }

    /// Initial temperature of every cell.
    pub fn init_temp(&self) -> &[f32] {
        &self.init_temp
    }

    /// Temperature of the cooling air.
    pub fn cooler_temp(&self) -> f32 {
        self.cooler_temp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(edge: usize) -> MaterialProperties {
        let n = edge * edge;
        MaterialProperties::new(edge, vec![1.0; n], vec![CONDUCTOR; n], vec![20.0; n], 0.0)
            .unwrap()
    }

    #[test]
    fn valid_material_accessors() {
        let m = uniform(4);
        assert_eq!(m.edge_size(), 4);
        assert_eq!(m.n_grid_points(), 16);
        assert_eq!(m.init_temp().len(), 16);
        assert_eq!(m.cooler_temp(), 0.0);
    }

    #[test]
    fn empty_grid_rejected() {
        let err = MaterialProperties::new(0, vec![], vec![], vec![], 0.0).unwrap_err();
        assert_eq!(err, MaterialError::EmptyGrid);
    }

    #[test]
    fn wrong_length_rejected() {
        let err =
            MaterialProperties::new(2, vec![1.0; 4], vec![1; 3], vec![0.0; 4], 0.0).unwrap_err();
        match err {
            MaterialError::ShapeMismatch {
                array: "domain_map",
                expected: 4,
                got: 3,
            } => {}
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_conductance_rejected() {
        let mut params = vec![1.0; 4];
        params[2] = 0.0;
        let err = MaterialProperties::new(2, params, vec![1; 4], vec![0.0; 4], 0.0).unwrap_err();
        assert!(matches!(err, MaterialError::InvalidConductance { cell: 2, .. }));
    }

    #[test]
    fn non_binary_map_rejected() {
        let err =
            MaterialProperties::new(2, vec![1.0; 4], vec![0, 1, 2, 1], vec![0.0; 4], 0.0)
                .unwrap_err();
        assert_eq!(err, MaterialError::InvalidMapValue { cell: 2, value: 2 });
    }

    #[test]
    fn nan_cooler_rejected() {
        let err = MaterialProperties::new(2, vec![1.0; 4], vec![1; 4], vec![0.0; 4], f32::NAN)
            .unwrap_err();
        assert_eq!(err, MaterialError::NonFiniteTemperature { cell: None });
        assert!(err.to_string().contains("cooler"));
    }
}
