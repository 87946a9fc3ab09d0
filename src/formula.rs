use std::fmt;

/// Formulas that take a single operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    SinX,
    CosX,
    SinY,
    CosY,
}

/// Formulas that take two operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    SinXPlusY,
    CosXPlusY,
    XMulY,
    SinCosXPlusY,
}

/// A node label. The family decides how many children a node carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Formula {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

pub const UNARY: [Formula; 4] = [
    Formula::Unary(UnaryOp::SinX),
    Formula::Unary(UnaryOp::CosX),
    Formula::Unary(UnaryOp::SinY),
    Formula::Unary(UnaryOp::CosY),
];

pub const BINARY: [Formula; 4] = [
    Formula::Binary(BinaryOp::SinXPlusY),
    Formula::Binary(BinaryOp::CosXPlusY),
    Formula::Binary(BinaryOp::XMulY),
    Formula::Binary(BinaryOp::SinCosXPlusY),
];

/// Draw order matters for reproducibility: unary family first, then binary.
pub const ALL: [Formula; 8] = [
    UNARY[0], UNARY[1], UNARY[2], UNARY[3], BINARY[0], BINARY[1], BINARY[2], BINARY[3],
];

impl UnaryOp {
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::SinX => "SINX",
            UnaryOp::CosX => "COSX",
            UnaryOp::SinY => "SINY",
            UnaryOp::CosY => "COSY",
        }
    }

    /// `sin` for the SIN* pair, `cos` for the COS* pair. The X/Y suffix is
    /// only consulted at leaves.
    pub fn apply(self, v: f64) -> f64 {
        match self {
            UnaryOp::SinX | UnaryOp::SinY => v.sin(),
            UnaryOp::CosX | UnaryOp::CosY => v.cos(),
        }
    }
}

impl BinaryOp {
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::SinXPlusY => "SINXPLUSY",
            BinaryOp::CosXPlusY => "COSXPLUSY",
            BinaryOp::XMulY => "XMALY",
            BinaryOp::SinCosXPlusY => "SINCOSXPLUSY",
        }
    }

    pub fn apply(self, l: f64, r: f64) -> f64 {
        match self {
            BinaryOp::XMulY => l * r,
            BinaryOp::CosXPlusY => (l + r / 2.0).cos(),
            BinaryOp::SinXPlusY => (l + r / 2.0).sin(),
            BinaryOp::SinCosXPlusY => (l + r).cos().sin(),
        }
    }
}

impl Formula {
    pub fn name(self) -> &'static str {
        match self {
            Formula::Unary(op) => op.name(),
            Formula::Binary(op) => op.name(),
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Formula::Unary(_))
    }

    /// Leaves named after x (SINX, COSX) sample the x axis; every other
    /// formula, binary ones included, samples y.
    pub fn samples_x(self) -> bool {
        matches!(
            self,
            Formula::Unary(UnaryOp::SinX) | Formula::Unary(UnaryOp::CosX)
        )
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
