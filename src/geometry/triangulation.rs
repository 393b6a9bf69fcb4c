//! n 边形三角化（二分细分）
//!
//! 不是耳切也不是扇形：以 `step = 1, 2, 4, …` 逐层二分，
//! 每层取 `(i, i + step, (i + 2·step) mod n)`，跳过含重复位置的退化三角形。
//! 奇数边形先复制最后一个位置，使工作序列长度为偶数。
//! 结果只依赖 n，确定且无状态。

/// 按多边形内位置（0..n）三角化。
///
/// 当另一个按角存储的数组（例如 UV 索引）必须和顶点索引保持同步时使用这种模式，
/// 把同一组位置三元组同时应用到两个数组上。
pub fn triangulate_positions(n: usize) -> Vec<[usize; 3]> {
    if n < 3 {
        return Vec::new();
    }

    let mut working: Vec<usize> = (0..n).collect();
    if n % 2 == 1 {
        working.push(n - 1);
    }

    let len = working.len();
    let mut triangles = Vec::with_capacity(n);
    let mut step = 1;
    while step < len {
        let mut i = 0;
        while i + step < len {
            let triangle = [
                working[i],
                working[i + step],
                working[(i + 2 * step) % len],
            ];
            if !has_repeated(&triangle) {
                triangles.push(triangle);
            }
            i += 2 * step;
        }
        step *= 2;
    }

    triangles
}

/// 直接在顶点索引上三角化，额外跳过引用同一顶点的三角形。
/// 没有需要同步的按角属性时使用。
pub fn triangulate_indices(indices: &[u32]) -> Vec<[u32; 3]> {
    triangulate_positions(indices.len())
        .into_iter()
        .map(|[a, b, c]| [indices[a], indices[b], indices[c]])
        .filter(|triangle| !has_repeated(triangle))
        .collect()
}

/// 将位置三元组展开为按角数组
pub fn apply_triangulation<T: Copy>(values: &[T], triangles: &[[usize; 3]]) -> Vec<T> {
    triangles
        .iter()
        .flat_map(|triangle| triangle.iter().map(|&position| values[position]))
        .collect()
}

#[inline]
fn has_repeated<T: PartialEq>(triangle: &[T; 3]) -> bool {
    triangle[0] == triangle[1] || triangle[1] == triangle[2] || triangle[0] == triangle[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_and_quad() {
        assert_eq!(triangulate_positions(3), vec![[0, 1, 2]]);
        assert_eq!(triangulate_positions(4), vec![[0, 1, 2], [2, 3, 0]]);
    }

    #[test]
    fn fewer_than_three_positions_yield_nothing() {
        assert!(triangulate_positions(0).is_empty());
        assert!(triangulate_positions(2).is_empty());
    }

    #[test]
    fn octagon_matches_reference() {
        let expected = vec![
            [0, 1, 2],
            [2, 3, 4],
            [4, 5, 6],
            [6, 7, 0],
            [0, 2, 4],
            [4, 6, 0],
        ];
        assert_eq!(triangulate_positions(8), expected);
    }

    #[test]
    fn nonagon_duplicates_last_position() {
        let expected = vec![
            [0, 1, 2],
            [2, 3, 4],
            [4, 5, 6],
            [6, 7, 8],
            [0, 2, 4],
            [4, 6, 8],
            [0, 4, 8],
            [0, 8, 6],
        ];
        assert_eq!(triangulate_positions(9), expected);
    }

    #[test]
    fn power_of_two_polygons_yield_n_minus_two() {
        for n in [4usize, 8, 16, 32] {
            assert_eq!(triangulate_positions(n).len(), n - 2, "n = {}", n);
        }
    }

    #[test]
    fn hexagon_keeps_wrapped_top_level() {
        // 最后一层绕回，产生 (0, 2, 4) 的反向副本
        let expected = vec![[0, 1, 2], [2, 3, 4], [4, 5, 0], [0, 2, 4], [0, 4, 2]];
        assert_eq!(triangulate_positions(6), expected);
        assert_eq!(triangulate_indices(&[0, 1, 2, 3, 4, 5]).len(), 5);
    }

    #[test]
    fn every_position_is_covered() {
        for n in 3..20 {
            let triangles = triangulate_positions(n);
            for position in 0..n {
                assert!(
                    triangles.iter().any(|t| t.contains(&position)),
                    "position {} missing for n = {}",
                    position,
                    n
                );
            }
        }
    }

    #[test]
    fn index_mode_maps_and_drops_repeated_vertices() {
        assert_eq!(
            triangulate_indices(&[10, 11, 12, 13]),
            vec![[10, 11, 12], [12, 13, 10]]
        );
        // 顶点 7 出现两次的四边形，其中一个三角形退化
        assert_eq!(triangulate_indices(&[7, 8, 9, 7]), vec![[7, 8, 9]]);
    }

    #[test]
    fn position_mode_keeps_parallel_arrays_in_sync() {
        let vertex_indices = [5u32, 6, 7, 8];
        let uv_indices = [0u32, 1, 0, 2];
        let triangles = triangulate_positions(vertex_indices.len());
        assert_eq!(
            apply_triangulation(&vertex_indices, &triangles),
            vec![5, 6, 7, 7, 8, 5]
        );
        assert_eq!(
            apply_triangulation(&uv_indices, &triangles),
            vec![0, 1, 0, 0, 2, 0]
        );
    }
}
