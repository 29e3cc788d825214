use super::TraitNode;
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 参数节点：反向传播时梯度会累积到这里（不会自动清零，需显式调用`zero_grad`）
#[derive(Clone)]
pub(in crate::nn) struct Parameter {
    value: Tensor,
    grad: Option<Tensor>,
}

impl Parameter {
    pub(in crate::nn) fn new(value: &Tensor) -> Self {
        Self {
            value: value.clone(),
            grad: None,
        }
    }
}

impl TraitNode for Parameter {
    fn type_name(&self) -> &'static str {
        "parameter"
    }

    fn value(&self) -> &Tensor {
        &self.value
    }

    fn set_value(&mut self, value: &Tensor) -> Result<(), GraphError> {
        self.value = value.clone();
        Ok(())
    }

    fn calc_grad_to_parent(
        &self,
        _parent_index: usize,
        _parents: &[&Tensor],
        _upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "参数节点没有父节点。不该触及本错误，否则说明crate代码有问题".to_string(),
        ))
    }

    fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    fn set_grad(&mut self, grad: Option<&Tensor>) -> Result<(), GraphError> {
        if let Some(grad) = grad {
            if grad.shape() != self.value.shape() {
                return Err(GraphError::ShapeMismatch {
                    expected: self.value.shape().to_vec(),
                    got: grad.shape().to_vec(),
                    message: "参数的梯度形状必须与参数一致".to_string(),
                });
            }
        }
        self.grad = grad.cloned();
        Ok(())
    }
}
