/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 图编译（JIT）：首次调用时把函数追踪成一段`Program`，之后直接回放。
 *
 * 被编译的函数签名统一为`Fn(&[Var]) -> Result<Vec<Var>, GraphError>`。
 * - 追踪：记录函数执行期间新建的所有节点（算子 + 常量），做死节点消除，并把参数形状记为守卫
 * - 回放：校验守卫后按指令逐条在图上创建节点，不再调用原函数
 * - 追踪失败或守卫不满足一律返回`GraphError::CompilationError`，不会退回即时执行
 */

mod program;
mod trace;

pub use program::{Instruction, Operand, Program};

use super::{GraphError, Var};
use log::debug;
use std::cell::RefCell;

/// 被编译后的函数
pub struct TracedFn<F> {
    name: String,
    f: F,
    program: RefCell<Option<Program>>,
}

/// 编译一个函数。真正的追踪推迟到第一次调用时进行（需要实际参数来确定形状）
pub fn compile<F>(name: &str, f: F) -> TracedFn<F>
where
    F: Fn(&[Var]) -> Result<Vec<Var>, GraphError>,
{
    TracedFn {
        name: name.to_string(),
        f,
        program: RefCell::new(None),
    }
}

impl<F> TracedFn<F>
where
    F: Fn(&[Var]) -> Result<Vec<Var>, GraphError>,
{
    pub fn call(&self, args: &[Var]) -> Result<Vec<Var>, GraphError> {
        if let Some(program) = self.program.borrow().as_ref() {
            program.check_guards(args)?;
            return program.replay(args);
        }

        let (program, outputs) = trace::trace(&self.f, args)?;
        debug!(
            "编译函数`{}`：追踪得到{}条指令（消除死节点{}个），参数守卫{:?}",
            self.name,
            program.len(),
            program.eliminated(),
            program.guards()
        );
        *self.program.borrow_mut() = Some(program);
        Ok(outputs)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_traced(&self) -> bool {
        self.program.borrow().is_some()
    }

    /// 追踪得到的程序（尚未追踪则为None）
    pub fn program(&self) -> Option<Program> {
        self.program.borrow().clone()
    }
}
