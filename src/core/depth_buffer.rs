/// 深度缓冲区：每像素一个深度值，数值越小表示越近
///
/// 每帧开始时 `clear()` 为最大可表示值，光栅化期间单调降低，之后只读直到下一帧。
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    width: usize,
    height: usize,
    depths: Vec<f32>,
}

impl DepthBuffer {
    pub const CLEARED: f32 = f32::MAX;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            depths: vec![Self::CLEARED; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 重置所有单元为最大值
    pub fn clear(&mut self) {
        self.depths.fill(Self::CLEARED);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            None
        } else {
            Some(y as usize * self.width + x as usize)
        }
    }

    /// 深度测试：越界或不严格小于已存值时返回 false 且不写入
    #[inline]
    pub fn test_and_set(&mut self, x: i32, y: i32, depth: f32) -> bool {
        match self.index(x, y) {
            Some(index) if depth < self.depths[index] => {
                self.depths[index] = depth;
                true
            }
            _ => false,
        }
    }

    /// 越界时返回 `CLEARED`
    #[inline]
    pub fn get_depth(&self, x: i32, y: i32) -> f32 {
        self.index(x, y).map_or(Self::CLEARED, |index| self.depths[index])
    }

    /// 不做比较直接写入（用于高亮等后处理）；越界时忽略
    #[inline]
    pub fn set_depth(&mut self, x: i32, y: i32, depth: f32) {
        if let Some(index) = self.index(x, y) {
            self.depths[index] = depth;
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.depths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearer_depth_wins() {
        let mut buffer = DepthBuffer::new(4, 4);
        buffer.clear();
        assert!(buffer.test_and_set(1, 2, 0.5));
        assert!(!buffer.test_and_set(1, 2, 0.9));
        assert_eq!(buffer.get_depth(1, 2), 0.5);
        assert!(buffer.test_and_set(1, 2, 0.3));
        assert_eq!(buffer.get_depth(1, 2), 0.3);
    }

    #[test]
    fn equal_depth_is_rejected() {
        let mut buffer = DepthBuffer::new(2, 2);
        assert!(buffer.test_and_set(0, 0, 0.5));
        assert!(!buffer.test_and_set(0, 0, 0.5));
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut buffer = DepthBuffer::new(2, 2);
        assert!(!buffer.test_and_set(-1, 0, 0.1));
        assert!(!buffer.test_and_set(2, 0, 0.1));
        assert!(!buffer.test_and_set(0, 2, 0.1));
        assert_eq!(buffer.get_depth(5, 5), DepthBuffer::CLEARED);
        buffer.set_depth(9, 9, 0.0);
        assert!(buffer.as_slice().iter().all(|&d| d == DepthBuffer::CLEARED));
    }

    #[test]
    fn set_depth_overrides_without_test() {
        let mut buffer = DepthBuffer::new(2, 2);
        buffer.test_and_set(1, 1, 0.2);
        buffer.set_depth(1, 1, 0.8);
        assert_eq!(buffer.get_depth(1, 1), 0.8);
    }

    #[test]
    fn clear_resets_every_cell() {
        let mut buffer = DepthBuffer::new(3, 2);
        buffer.test_and_set(0, 0, 0.1);
        buffer.test_and_set(2, 1, 0.2);
        buffer.clear();
        assert!(buffer.as_slice().iter().all(|&d| d == DepthBuffer::CLEARED));
    }
}
