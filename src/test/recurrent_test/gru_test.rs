use super::*;

#[test]
fn test_gru_forward_matches_closed_form() {
    let mut cell = GRU::new(4, 3).unwrap();
    let [wr, bwr, ur, bur, wz, bwz, uz, buz, w, bw, u, bu] = fixture(4, 3);
    cell.set_weights(
        wr.clone(),
        bwr.clone(),
        ur.clone(),
        bur.clone(),
        wz.clone(),
        bwz.clone(),
        uz.clone(),
        buz.clone(),
        w.clone(),
        bw.clone(),
        u.clone(),
        bu.clone(),
    );

    let h = patterned(2, 3, 0.5);
    let x = patterned(2, 4, 1.0);

    // Recompute the recurrence independently from the same fixture:
    //   r  = sigmoid(W_r x + U_r h)
    //   z  = sigmoid(W_z x + U_z h)
    //   h̄  = tanh(W x + U (r ⊙ h))
    //   h' = (1 - z) ⊙ h + z ⊙ h̄
    let r = sigmoid(&(x.dot(&wr) + &bwr + h.dot(&ur) + &bur));
    let z = sigmoid(&(x.dot(&wz) + &bwz + h.dot(&uz) + &buz));
    let h_bar = tanh_arr(&(x.dot(&w) + &bw + (&r * &h).dot(&u) + &bu));
    let expected = &(1.0 - &z) * &h + &z * &h_bar;

    let actual = cell.forward(&h, &x).unwrap();
    assert_close(&actual, &expected, 1e-5);
}

#[test]
fn test_gru_forward_shape() {
    let mut cell = GRU::new(5, 7).unwrap();
    let h = Array2::<f32>::zeros((3, 7));
    let x = Array2::<f32>::ones((3, 5));
    let h_next = cell.forward(&h, &x).unwrap();
    assert_eq!(h_next.shape(), &[3, 7]);
}

#[test]
fn test_gru_rejects_mismatched_shapes() {
    let mut cell = GRU::new(4, 3).unwrap();

    // Wrong input width
    let h = Array2::<f32>::zeros((2, 3));
    let x_bad = Array2::<f32>::ones((2, 5));
    assert!(matches!(
        cell.forward(&h, &x_bad),
        Err(ModelError::InputValidationError(_))
    ));

    // Wrong hidden width
    let h_bad = Array2::<f32>::zeros((2, 4));
    let x = Array2::<f32>::ones((2, 4));
    assert!(matches!(
        cell.forward(&h_bad, &x),
        Err(ModelError::InputValidationError(_))
    ));

    // Mismatched batch sizes
    let h = Array2::<f32>::zeros((2, 3));
    let x_batch = Array2::<f32>::ones((3, 4));
    assert!(matches!(
        cell.forward(&h, &x_batch),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_gru_rejects_zero_dimensions() {
    assert!(GRU::new(0, 3).is_err());
    assert!(GRU::new(3, 0).is_err());
}

#[test]
fn test_gru_param_count() {
    let cell = GRU::new(4, 3).unwrap();
    // Three input projections (4×3 + 3) and three recurrent projections (3×3 + 3)
    assert_eq!(cell.param_count(), 3 * (4 * 3 + 3) + 3 * (3 * 3 + 3));
}

#[test]
fn test_gru_backward_requires_forward() {
    let mut cell = GRU::new(4, 3).unwrap();
    let grad = Array2::<f32>::ones((2, 3));
    assert!(matches!(
        cell.backward(&grad),
        Err(ModelError::ProcessingError(_))
    ));
}

#[test]
fn test_gru_backward_shapes_and_gradient_population() {
    let mut cell = GRU::new(4, 3).unwrap();
    set_fixture(&mut cell, 4, 3);

    let h = patterned(2, 3, 0.5);
    let x = patterned(2, 4, 1.0);
    cell.forward(&h, &x).unwrap();

    let grad = Array2::<f32>::ones((2, 3));
    let (grad_hidden, grad_input) = cell.backward(&grad).unwrap();
    assert_eq!(grad_hidden.shape(), &[2, 3]);
    assert_eq!(grad_input.shape(), &[2, 4]);

    // Every unit received a gradient
    assert!(cell.reset_input.grad_kernel.is_some());
    assert!(cell.reset_recurrent.grad_kernel.is_some());
    assert!(cell.update_input.grad_kernel.is_some());
    assert!(cell.update_recurrent.grad_kernel.is_some());
    assert!(cell.candidate_input.grad_kernel.is_some());
    assert!(cell.candidate_recurrent.grad_kernel.is_some());
    assert!(cell.reset_input.grad_bias.is_some());

    // A second step accumulates instead of overwriting
    let first = cell.update_input.grad_kernel.clone().unwrap();
    cell.forward(&h, &x).unwrap();
    cell.backward(&grad).unwrap();
    let second = cell.update_input.grad_kernel.clone().unwrap();
    assert_close(&second, &(&first * 2.0), 1e-5);

    cell.zero_gradients();
    assert!(cell.update_input.grad_kernel.is_none());
    assert!(cell.update_input.grad_bias.is_none());
}

#[test]
fn test_gru_input_gradient_matches_finite_difference() {
    let mut cell = GRU::new(4, 3).unwrap();
    set_fixture(&mut cell, 4, 3);

    let h = patterned(2, 3, 0.5);
    let x = patterned(2, 4, 1.0);

    cell.forward(&h, &x).unwrap();
    let grad = Array2::<f32>::ones((2, 3));
    let (grad_hidden, grad_input) = cell.backward(&grad).unwrap();

    // Central finite difference of the summed output with respect to one
    // input element and one hidden element
    let eps = 1e-2f32;

    let mut x_plus = x.clone();
    x_plus[[0, 1]] += eps;
    let mut x_minus = x.clone();
    x_minus[[0, 1]] -= eps;
    let sum_plus: f32 = cell.forward(&h, &x_plus).unwrap().sum();
    let sum_minus: f32 = cell.forward(&h, &x_minus).unwrap().sum();
    let numeric = (sum_plus - sum_minus) / (2.0 * eps);
    assert!(
        (numeric - grad_input[[0, 1]]).abs() < 1e-2,
        "input gradient {} does not match finite difference {}",
        grad_input[[0, 1]],
        numeric
    );

    let mut h_plus = h.clone();
    h_plus[[1, 2]] += eps;
    let mut h_minus = h.clone();
    h_minus[[1, 2]] -= eps;
    let sum_plus: f32 = cell.forward(&h_plus, &x).unwrap().sum();
    let sum_minus: f32 = cell.forward(&h_minus, &x).unwrap().sum();
    let numeric = (sum_plus - sum_minus) / (2.0 * eps);
    assert!(
        (numeric - grad_hidden[[1, 2]]).abs() < 1e-2,
        "hidden gradient {} does not match finite difference {}",
        grad_hidden[[1, 2]],
        numeric
    );
}

#[test]
fn test_gru_weight_gradient_matches_finite_difference() {
    let mut cell = GRU::new(4, 3).unwrap();
    set_fixture(&mut cell, 4, 3);

    let h = patterned(2, 3, 0.5);
    let x = patterned(2, 4, 1.0);

    cell.forward(&h, &x).unwrap();
    let grad = Array2::<f32>::ones((2, 3));
    cell.backward(&grad).unwrap();
    let analytic = cell.reset_input.grad_kernel.as_ref().unwrap()[[0, 1]];

    let eps = 1e-2f32;
    let base = cell.reset_input.kernel[[0, 1]];

    cell.reset_input.kernel[[0, 1]] = base + eps;
    let sum_plus: f32 = cell.forward(&h, &x).unwrap().sum();
    cell.reset_input.kernel[[0, 1]] = base - eps;
    let sum_minus: f32 = cell.forward(&h, &x).unwrap().sum();
    cell.reset_input.kernel[[0, 1]] = base;

    let numeric = (sum_plus - sum_minus) / (2.0 * eps);
    assert!(
        (numeric - analytic).abs() < 1e-2,
        "weight gradient {} does not match finite difference {}",
        analytic,
        numeric
    );
}

#[test]
fn test_gru_sgd_update_moves_parameters() {
    let mut cell = GRU::new(4, 3).unwrap();
    set_fixture(&mut cell, 4, 3);

    let before = cell.update_input.kernel.clone();

    let h = patterned(2, 3, 0.5);
    let x = patterned(2, 4, 1.0);
    cell.forward(&h, &x).unwrap();
    cell.backward(&Array2::<f32>::ones((2, 3))).unwrap();
    cell.update_parameters_sgd(0.1);

    let after = &cell.update_input.kernel;
    let change: f32 = (after - &before).mapv(f32::abs).sum();
    assert!(change > 1e-6, "kernel should change during training");
}

#[test]
fn test_gru_get_weights_view() {
    let mut cell = GRU::new(4, 3).unwrap();
    set_fixture(&mut cell, 4, 3);

    let weights = cell.get_weights();
    assert_eq!(weights.reset_input.kernel.shape(), &[4, 3]);
    assert_eq!(weights.reset_recurrent.kernel.shape(), &[3, 3]);
    assert_eq!(weights.candidate_input.bias.unwrap().shape(), &[1, 3]);
}
