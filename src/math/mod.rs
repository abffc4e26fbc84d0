use std::ops;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct V3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct M3 {
    pub v0: V3,
    pub v1: V3,
    pub v2: V3,
}

impl M3 {
    pub fn new(v0: V3, v1: V3, v2: V3) -> M3 {
        M3 { v0, v1, v2 }
    }

    pub fn t(&self) -> M3 {
        M3 {
            v0: v(self.v0.x, self.v1.x, self.v2.x),
            v1: v(self.v0.y, self.v1.y, self.v2.y),
            v2: v(self.v0.z, self.v1.z, self.v2.z),
        }
    }
}

pub fn v(x: f64, y: f64, z: f64) -> V3 {
    V3 { x, y, z }
}

pub fn splat(s: f64) -> V3 {
    V3 { x: s, y: s, z: s }
}

pub fn add(x: &V3, y: &V3) -> V3 {
    V3 {
        x: x.x + y.x,
        y: x.y + y.y,
        z: x.z + y.z,
    }
}

pub fn sub(x: &V3, y: &V3) -> V3 {
    V3 {
        x: x.x - y.x,
        y: x.y - y.y,
        z: x.z - y.z,
    }
}

pub fn mul(scalar: f64, x: &V3) -> V3 {
    V3 {
        x: x.x * scalar,
        y: x.y * scalar,
        z: x.z * scalar,
    }
}

pub fn abs2(x: &V3) -> f64 {
    x.x * x.x + x.y * x.y + x.z * x.z
}

pub fn abs(x: &V3) -> f64 {
    abs2(x).sqrt()
}

pub fn dist(x: &V3, y: &V3) -> f64 {
    abs(&sub(x, y))
}

pub fn normalize(x: &V3) -> V3 {
    mul(1. / abs(x), x)
}

pub fn dot(x: &V3, y: &V3) -> f64 {
    x.x * y.x + x.y * y.y + x.z * y.z
}

pub fn cross(v1: &V3, v2: &V3) -> V3 {
    v(
        v1.y * v2.z - v1.z * v2.y,
        v1.z * v2.x - v1.x * v2.z,
        v1.x * v2.y - v1.y * v2.x,
    )
}

pub fn vabs(x: &V3) -> V3 {
    v(x.x.abs(), x.y.abs(), x.z.abs())
}

pub fn vmax(a: &V3, b: &V3) -> V3 {
    v(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}

pub fn max_component(x: &V3) -> f64 {
    x.x.max(x.y.max(x.z))
}

pub fn clamp01(x: &V3) -> V3 {
    v(x.x.clamp(0., 1.), x.y.clamp(0., 1.), x.z.clamp(0., 1.))
}

pub fn mix(a: &V3, b: &V3, t: f64) -> V3 {
    add(&mul(1. - t, a), &mul(t, b))
}

impl ops::Add<V3> for V3 {
    type Output = V3;

    fn add(self, rhs: V3) -> V3 {
        add(&self, &rhs)
    }
}

impl ops::Sub<V3> for V3 {
    type Output = V3;

    fn sub(self, rhs: V3) -> V3 {
        sub(&self, &rhs)
    }
}

impl ops::Mul<V3> for f64 {
    type Output = V3;

    fn mul(self, rhs: V3) -> Self::Output {
        mul(self, &rhs)
    }
}

impl ops::Mul<V3> for M3 {
    type Output = V3;

    fn mul(self, rhs: V3) -> Self::Output {
        rhs.x * self.v0 + rhs.y * self.v1 + rhs.z * self.v2
    }
}

pub const B1: V3 = V3 {
    x: 1.,
    y: 0.,
    z: 0.,
};

pub const B2: V3 = V3 {
    x: 0.,
    y: 1.,
    z: 0.,
};

pub const B3: V3 = V3 {
    x: 0.,
    y: 0.,
    z: 1.,
};

pub const O: V3 = V3 {
    x: 0.,
    y: 0.,
    z: 0.,
};
