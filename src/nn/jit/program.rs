use crate::nn::{Graph, GraphError, NodeId, OpKind, Var};
use crate::tensor::Tensor;

/// 指令的操作数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// 第i个参数
    Arg(usize),
    /// 第i条指令的结果
    Local(usize),
    /// 追踪开始前就已存在于图中的节点（被函数捕获的外部变量）
    Captured(NodeId),
}

#[derive(Debug, Clone)]
pub enum Instruction {
    /// 函数内部新建的常量输入
    Literal(Tensor),
    Op { op: OpKind, operands: Vec<Operand> },
}

/// 追踪得到的程序
#[derive(Debug, Clone)]
pub struct Program {
    guards: Vec<Vec<usize>>,
    /// 第i个参数在追踪时与哪个参数是同一节点（取最小下标，不重复时为i自身）
    aliases: Vec<usize>,
    instructions: Vec<Instruction>,
    outputs: Vec<Operand>,
    eliminated: usize,
}

impl Program {
    pub(super) fn new(
        guards: Vec<Vec<usize>>,
        aliases: Vec<usize>,
        instructions: Vec<Instruction>,
        outputs: Vec<Operand>,
    ) -> Self {
        let mut program = Self {
            guards,
            aliases,
            instructions,
            outputs,
            eliminated: 0,
        };
        program.eliminate_dead_nodes();
        program
    }

    /// 追踪时各参数的形状
    pub fn guards(&self) -> &[Vec<usize>] {
        &self.guards
    }

    pub fn aliases(&self) -> &[usize] {
        &self.aliases
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn outputs(&self) -> &[Operand] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// 死节点消除时删掉的指令数
    pub const fn eliminated(&self) -> usize {
        self.eliminated
    }

    /// 删除对输出没有贡献的指令，并重新编号`Local`操作数
    fn eliminate_dead_nodes(&mut self) {
        let mut live = vec![false; self.instructions.len()];
        for operand in &self.outputs {
            if let Operand::Local(i) = operand {
                live[*i] = true;
            }
        }
        // 操作数只会引用更早的指令，所以倒序一遍即可
        for i in (0..self.instructions.len()).rev() {
            if !live[i] {
                continue;
            }
            if let Instruction::Op { operands, .. } = &self.instructions[i] {
                for operand in operands {
                    if let Operand::Local(j) = operand {
                        live[*j] = true;
                    }
                }
            }
        }

        let mut new_index = vec![None; self.instructions.len()];
        let mut kept = Vec::new();
        for (i, instruction) in std::mem::take(&mut self.instructions).into_iter().enumerate() {
            if live[i] {
                new_index[i] = Some(kept.len());
                kept.push(instruction);
            }
        }
        let remap = |operand: &mut Operand| {
            if let Operand::Local(i) = operand {
                // 活指令只引用活指令
                *i = new_index[*i].unwrap_or(*i);
            }
        };
        for instruction in &mut kept {
            if let Instruction::Op { operands, .. } = instruction {
                operands.iter_mut().for_each(remap);
            }
        }
        self.outputs.iter_mut().for_each(remap);

        self.eliminated = live.len() - kept.len();
        self.instructions = kept;
    }

    /// 校验参数个数、所属图、形状以及参数间的别名关系是否与追踪时一致
    pub(super) fn check_guards(&self, args: &[Var]) -> Result<(), GraphError> {
        if args.len() != self.guards.len() {
            return Err(GraphError::CompilationError(format!(
                "参数个数{}与追踪时的{}不一致",
                args.len(),
                self.guards.len()
            )));
        }
        if args.iter().any(|arg| !arg.same_graph(&args[0])) {
            return Err(GraphError::CompilationError(
                "所有参数必须来自同一个 Graph".to_string(),
            ));
        }
        for (i, (arg, expected)) in args.iter().zip(&self.guards).enumerate() {
            let got = arg.value_expected_shape()?;
            if &got != expected {
                return Err(GraphError::CompilationError(format!(
                    "第{i}个参数的形状{got:?}与追踪时的{expected:?}不一致"
                )));
            }
        }
        let aliases = alias_pattern(args);
        if aliases != self.aliases {
            return Err(GraphError::CompilationError(format!(
                "参数间的别名关系{aliases:?}与追踪时的{:?}不一致",
                self.aliases
            )));
        }
        Ok(())
    }

    /// 在参数所在的图上回放程序（调用前须已通过守卫校验）
    pub(super) fn replay(&self, args: &[Var]) -> Result<Vec<Var>, GraphError> {
        let Some(first) = args.first() else {
            return Err(GraphError::CompilationError(
                "回放需要至少1个参数".to_string(),
            ));
        };
        let graph: Graph = first.get_graph();
        let mut locals: Vec<NodeId> = Vec::with_capacity(self.instructions.len());
        {
            let mut inner = graph.inner_mut();
            for instruction in &self.instructions {
                let id = match instruction {
                    Instruction::Literal(value) => inner.new_input_node(value, None),
                    Instruction::Op { op, operands } => {
                        let parents = operands
                            .iter()
                            .map(|operand| resolve(*operand, args, &locals))
                            .collect::<Vec<_>>();
                        inner
                            .new_op_node(op, &parents, None)
                            .map_err(|e| GraphError::CompilationError(format!("回放失败：{e}")))?
                    }
                };
                locals.push(id);
            }
        }
        Ok(self
            .outputs
            .iter()
            .map(|operand| graph.wrap_node_id(resolve(*operand, args, &locals)))
            .collect())
    }
}

/// 每个参数对应的首个同节点参数的下标
pub(super) fn alias_pattern(args: &[Var]) -> Vec<usize> {
    args.iter()
        .enumerate()
        .map(|(i, arg)| {
            args[..i]
                .iter()
                .position(|earlier| earlier.node_id() == arg.node_id())
                .unwrap_or(i)
        })
        .collect()
}

fn resolve(operand: Operand, args: &[Var], locals: &[NodeId]) -> NodeId {
    match operand {
        Operand::Arg(i) => args[i].node_id(),
        Operand::Local(i) => locals[i],
        Operand::Captured(id) => id,
    }
}
