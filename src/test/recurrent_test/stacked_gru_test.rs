use super::*;
use ndarray::{Axis, concatenate, s};

#[test]
fn test_stack_construction_requires_at_least_one_layer() {
    assert!(matches!(
        StackedGRU::new(4, 3, 0),
        Err(ModelError::InputValidationError(_))
    ));
    assert!(StackedGRU::new(4, 3, 1).is_ok());
}

#[test]
fn test_stack_layer_sizing() {
    let stack = StackedGRU::new(4, 3, 3).unwrap();
    assert_eq!(stack.get_num_layers(), 3);
    assert_eq!(stack.layer(0).unwrap().get_input_dim(), 4);
    assert_eq!(stack.layer(1).unwrap().get_input_dim(), 3);
    assert_eq!(stack.layer(2).unwrap().get_input_dim(), 3);
    for i in 0..3 {
        assert_eq!(stack.layer(i).unwrap().get_units(), 3);
    }
    assert!(stack.layer(3).is_none());
}

#[test]
fn test_single_layer_stack_matches_single_cell() {
    let mut stack = StackedGRU::new(4, 3, 1).unwrap();
    let mut cell = GRU::new(4, 3).unwrap();
    set_fixture(stack.layer_mut(0).unwrap(), 4, 3);
    set_fixture(&mut cell, 4, 3);

    let h = patterned(2, 3, 0.5);
    let x = patterned(2, 4, 1.0);

    let from_stack = stack.forward(&h, &x).unwrap();
    let from_cell = cell.forward(&h, &x).unwrap();
    assert_eq!(from_stack, from_cell);
}

#[test]
fn test_two_layer_stack_matches_manual_composition() {
    let mut stack = StackedGRU::new(4, 3, 2).unwrap();
    let mut cell0 = GRU::new(4, 3).unwrap();
    let mut cell1 = GRU::new(3, 3).unwrap();
    set_fixture(stack.layer_mut(0).unwrap(), 4, 3);
    set_fixture(stack.layer_mut(1).unwrap(), 3, 3);
    set_fixture(&mut cell0, 4, 3);
    set_fixture(&mut cell1, 3, 3);

    let h0 = patterned(2, 3, 0.5);
    let h1 = patterned(2, 3, -0.3);
    let hidden = concatenate(Axis(1), &[h0.view(), h1.view()]).unwrap();
    let x = patterned(2, 4, 1.0);

    // Layer 0 consumes the external input, layer 1 consumes layer 0's output
    let out0 = cell0.forward(&h0, &x).unwrap();
    let out1 = cell1.forward(&h1, &out0).unwrap();
    let expected = concatenate(Axis(1), &[out0.view(), out1.view()]).unwrap();

    let actual = stack.forward(&hidden, &x).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_stack_rejects_wrong_hidden_width() {
    let mut stack = StackedGRU::new(4, 3, 2).unwrap();
    let hidden_bad = Array2::<f32>::zeros((2, 3));
    let x = Array2::<f32>::ones((2, 4));
    assert!(matches!(
        stack.forward(&hidden_bad, &x),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_stack_backward_shapes() {
    let mut stack = StackedGRU::new(4, 3, 2).unwrap();
    set_fixture(stack.layer_mut(0).unwrap(), 4, 3);
    set_fixture(stack.layer_mut(1).unwrap(), 3, 3);

    let hidden = patterned(2, 6, 0.4);
    let x = patterned(2, 4, 1.0);
    stack.forward(&hidden, &x).unwrap();

    let grad = Array2::<f32>::ones((2, 6));
    let (grad_hidden, grad_input) = stack.backward(&grad).unwrap();
    assert_eq!(grad_hidden.shape(), &[2, 6]);
    assert_eq!(grad_input.shape(), &[2, 4]);
}

#[test]
fn test_stack_backward_requires_forward() {
    let mut stack = StackedGRU::new(4, 3, 2).unwrap();
    let grad = Array2::<f32>::ones((2, 6));
    assert!(stack.backward(&grad).is_err());
}

#[test]
fn test_stack_input_gradient_matches_finite_difference() {
    let mut stack = StackedGRU::new(4, 3, 2).unwrap();
    set_fixture(stack.layer_mut(0).unwrap(), 4, 3);
    set_fixture(stack.layer_mut(1).unwrap(), 3, 3);

    let hidden = patterned(2, 6, 0.4);
    let x = patterned(2, 4, 1.0);

    stack.forward(&hidden, &x).unwrap();
    let grad = Array2::<f32>::ones((2, 6));
    let (grad_hidden, grad_input) = stack.backward(&grad).unwrap();

    let eps = 1e-2f32;

    // External input element
    let mut x_plus = x.clone();
    x_plus[[0, 2]] += eps;
    let mut x_minus = x.clone();
    x_minus[[0, 2]] -= eps;
    let sum_plus: f32 = stack.forward(&hidden, &x_plus).unwrap().sum();
    let sum_minus: f32 = stack.forward(&hidden, &x_minus).unwrap().sum();
    let numeric = (sum_plus - sum_minus) / (2.0 * eps);
    assert!(
        (numeric - grad_input[[0, 2]]).abs() < 1e-2,
        "stack input gradient {} does not match finite difference {}",
        grad_input[[0, 2]],
        numeric
    );

    // Hidden element belonging to the first layer's slice; its gradient
    // includes the path through the second layer
    let mut h_plus = hidden.clone();
    h_plus[[1, 1]] += eps;
    let mut h_minus = hidden.clone();
    h_minus[[1, 1]] -= eps;
    let sum_plus: f32 = stack.forward(&h_plus, &x).unwrap().sum();
    let sum_minus: f32 = stack.forward(&h_minus, &x).unwrap().sum();
    let numeric = (sum_plus - sum_minus) / (2.0 * eps);
    assert!(
        (numeric - grad_hidden[[1, 1]]).abs() < 1e-2,
        "stack hidden gradient {} does not match finite difference {}",
        grad_hidden[[1, 1]],
        numeric
    );
}

#[test]
fn test_stack_output_slices_follow_layer_order() {
    let mut stack = StackedGRU::new(4, 3, 2).unwrap();
    let mut cell0 = GRU::new(4, 3).unwrap();
    set_fixture(stack.layer_mut(0).unwrap(), 4, 3);
    set_fixture(stack.layer_mut(1).unwrap(), 3, 3);
    set_fixture(&mut cell0, 4, 3);

    let h0 = patterned(2, 3, 0.5);
    let h1 = patterned(2, 3, -0.3);
    let hidden = concatenate(Axis(1), &[h0.view(), h1.view()]).unwrap();
    let x = patterned(2, 4, 1.0);

    let out = stack.forward(&hidden, &x).unwrap();
    let expected0 = cell0.forward(&h0, &x).unwrap();

    // The first slice of the output is layer 0's next hidden state
    let slice0 = out.slice(s![.., 0..3]).to_owned();
    assert_eq!(slice0, expected0);
}
