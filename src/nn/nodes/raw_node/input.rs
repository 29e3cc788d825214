use super::TraitNode;
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 输入节点：模型的输入数据、隐状态等不需要梯度的叶子节点
#[derive(Clone)]
pub(in crate::nn) struct Input {
    value: Tensor,
}

impl Input {
    pub(in crate::nn) fn new(value: &Tensor) -> Self {
        Self {
            value: value.clone(),
        }
    }
}

impl TraitNode for Input {
    fn type_name(&self) -> &'static str {
        "input"
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
            "输入节点没有父节点。不该触及本错误，否则说明crate代码有问题".to_string(),
        ))
    }
}
