use super::program::{Instruction, Operand, Program, alias_pattern};
use crate::nn::{GraphError, NodeId, Var};
use std::collections::HashMap;

/// 执行一次`f`并把期间新建的节点记录为程序。返回程序与本次执行的真实输出
pub(super) fn trace<F>(f: &F, args: &[Var]) -> Result<(Program, Vec<Var>), GraphError>
where
    F: Fn(&[Var]) -> Result<Vec<Var>, GraphError>,
{
    let Some(first) = args.first() else {
        return Err(GraphError::CompilationError(
            "被编译的函数至少需要1个参数".to_string(),
        ));
    };
    if args.iter().any(|arg| !arg.same_graph(first)) {
        return Err(GraphError::CompilationError(
            "所有参数必须来自同一个 Graph".to_string(),
        ));
    }
    let graph = first.get_graph();
    let guards = args
        .iter()
        .map(Var::value_expected_shape)
        .collect::<Result<Vec<_>, _>>()?;

    let mark = graph.watermark();
    let outputs = f(args).map_err(|e| GraphError::CompilationError(format!("追踪失败：{e}")))?;
    if outputs.iter().any(|out| !out.same_graph(first)) {
        return Err(GraphError::CompilationError(
            "输出必须与参数来自同一个 Graph".to_string(),
        ));
    }

    let inner = graph.inner();
    let mut operand_of: HashMap<NodeId, Operand> = HashMap::new();
    for (i, arg) in args.iter().enumerate() {
        operand_of.entry(arg.node_id()).or_insert(Operand::Arg(i));
    }
    let resolve = |operand_of: &HashMap<NodeId, Operand>, id: NodeId| {
        operand_of.get(&id).copied().unwrap_or(Operand::Captured(id))
    };

    let mut instructions = Vec::new();
    for id in inner.nodes_since(mark) {
        let instruction = match inner.get_node_op_kind(id)? {
            Some(op) => Instruction::Op {
                op,
                operands: inner
                    .get_node_parents(id)?
                    .into_iter()
                    .map(|parent| resolve(&operand_of, parent))
                    .collect(),
            },
            None if inner.is_parameter_node(id)? => {
                return Err(GraphError::CompilationError(format!(
                    "被编译的函数内部不能创建参数节点（{}）",
                    inner.get_node_name(id)?
                )));
            }
            None => Instruction::Literal(inner.get_node_value(id)?.clone()),
        };
        operand_of.insert(id, Operand::Local(instructions.len()));
        instructions.push(instruction);
    }

    let output_operands = outputs
        .iter()
        .map(|out| resolve(&operand_of, out.node_id()))
        .collect();
    drop(inner);

    Ok((
        Program::new(guards, alias_pattern(args), instructions, output_operands),
        outputs,
    ))
}
