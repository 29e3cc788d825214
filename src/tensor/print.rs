/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @Description  : 张量的打印。只展开0~2阶张量的数据，更高阶的只显示形状
 *                 （LSTM的输入输出多为3阶，调试时通常先`select`出某一步再打印）
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-11 10:31:02
 */

use crate::tensor::Tensor;
use std::fmt;

impl Tensor {
    pub fn print(&self) {
        println!("{self}");
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let shape = self.shape();
        match shape.len() {
            0 => write!(f, "{:8.4}", self.data.iter().next().copied().unwrap_or(0.0))?,
            1 => write_row(f, self.data.iter().copied())?,
            2 => {
                write!(f, "[")?;
                for (i, row) in self.data.outer_iter().enumerate() {
                    if i > 0 {
                        write!(f, ",\n ")?;
                    }
                    write_row(f, row.iter().copied())?;
                }
                write!(f, "]")?;
            }
            _ => {
                return writeln!(
                    f,
                    "<对于阶数大于二（rank>2）的张量（形状：{shape:?}）无法展示具体数据>"
                );
            }
        }
        writeln!(f, "\n形状: {shape:?}")
    }
}

fn write_row(f: &mut fmt::Formatter, values: impl Iterator<Item = f32>) -> fmt::Result {
    write!(f, "[")?;
    for (i, value) in values.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{value:8.4}")?;
    }
    write!(f, "]")
}
