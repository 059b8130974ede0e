pub mod test_agent;

use ndarray::{Array1, ArrayView1};

use crate::agent::ActionValueModel;
use crate::error::{DqnError, Result};

/// Model stub returning fixed action-values and recording every call.
pub struct StubModel {
    pub values: Array1<f32>,
    pub predict_calls: usize,
    pub fits: Vec<(Array1<f32>, Array1<f32>)>,
    pub fail_fit: bool,
}

impl StubModel {
    pub fn new(values: Array1<f32>) -> Self {
        StubModel {
            values,
            predict_calls: 0,
            fits: Vec::new(),
            fail_fit: false,
        }
    }
}

impl ActionValueModel for StubModel {
    fn predict(&mut self, _state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.predict_calls += 1;
        Ok(self.values.clone())
    }

    fn fit(&mut self, state: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<()> {
        if self.fail_fit {
            return Err(DqnError::NumericalError("fit failed".to_string()));
        }
        self.fits.push((state.to_owned(), target.to_owned()));
        Ok(())
    }
}

pub fn stub_factory(values: Array1<f32>) -> impl FnOnce(usize, usize) -> Result<StubModel> {
    move |_, _| Ok(StubModel::new(values))
}
