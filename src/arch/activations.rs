use ndarray::Array1;

pub fn sigmoid(z: f32) -> f32 {
    1. / (1. + (-z).exp())
}

/// Applies the logistic function to every component of `v`.
pub fn sigmoid_vec(v: Array1<f32>) -> Array1<f32> {
    v.mapv_into(sigmoid)
}

pub fn tanh_vec(v: Array1<f32>) -> Array1<f32> {
    v.mapv_into(f32::tanh)
}
