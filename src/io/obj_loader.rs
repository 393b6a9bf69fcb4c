use crate::model::mesh::{Mesh, Vertex};
use log::{debug, info, warn};
use nalgebra::{Vector2, Vector3};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// OBJ 加载结果：多边形网格以及 MTL 中声明的第一张漫反射纹理
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub name: String,
    pub mesh: Mesh,
    pub diffuse_texture: Option<PathBuf>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: false,  // 保留原始多边形，三角化由网格自己完成
        single_index: false, // 位置与纹理坐标各自独立索引，才能表达 UV 接缝
        ignore_points: true,
        ignore_lines: true,
    }
}

/// 从文件路径中提取基本文件名（不含扩展名）
fn get_basename_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 加载 OBJ 文件，所有子模型合并成一个网格
pub fn load_obj_model<P: AsRef<Path>>(obj_path: P) -> Result<LoadedModel, String> {
    let obj_path_ref = obj_path.as_ref();
    info!("加载 OBJ 文件: {:?}", obj_path_ref);

    let base_path = obj_path_ref.parent().unwrap_or_else(|| Path::new("."));

    let (models, materials_result) = tobj::load_obj(obj_path_ref, &load_options())
        .map_err(|e| format!("加载 OBJ 失败: {}", e))?;

    let diffuse_texture = match materials_result {
        Ok(materials) => {
            if !materials.is_empty() {
                info!("从 MTL 加载了 {} 个材质", materials.len());
            }
            materials
                .into_iter()
                .find_map(|mat| mat.diffuse_texture)
                .map(|tex_name| base_path.join(tex_name))
        }
        Err(e) => {
            warn!("加载材质失败: {}，使用默认材质", e);
            None
        }
    };

    if let Some(texture) = &diffuse_texture {
        debug!("MTL 漫反射纹理: {:?}", texture);
    }

    let mesh = build_mesh(&models)?;
    info!(
        "OBJ 加载完成: {} 个顶点, {} 个多边形, {} 个角{}",
        mesh.vertices.len(),
        mesh.polygon_count(),
        mesh.corner_count(),
        if mesh.has_texture_coordinates() {
            "（含纹理坐标）"
        } else {
            ""
        }
    );

    Ok(LoadedModel {
        name: get_basename_from_path(obj_path_ref),
        mesh,
        diffuse_texture,
    })
}

/// 从内存中的 OBJ 文本加载网格，忽略 `mtllib`
pub fn load_obj_from_reader<R: BufRead>(reader: &mut R) -> Result<Mesh, String> {
    let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .map_err(|e| format!("解析 OBJ 失败: {}", e))?;

    build_mesh(&models)
}

/// 合并 tobj 子模型：顶点追加、索引加偏移，纹理坐标转为每顶点 UV 变体
fn build_mesh(models: &[tobj::Model]) -> Result<Mesh, String> {
    if models.is_empty() {
        return Err("OBJ 文件不包含任何模型".to_string());
    }

    // UV 索引必须覆盖全部角，只要有一个子模型缺失就整体丢弃
    let use_texcoords = models
        .iter()
        .all(|m| !m.mesh.texcoords.is_empty() && !m.mesh.texcoord_indices.is_empty());
    if !use_texcoords && models.iter().any(|m| !m.mesh.texcoords.is_empty()) {
        warn!("部分子模型缺少纹理坐标，已忽略所有纹理坐标");
    }

    let mut vertices: Vec<Vertex> = Vec::new();
    let mut polygons: Vec<u32> = Vec::new();
    let mut boundaries: Vec<u32> = Vec::new();
    let mut texture_indices: Vec<u32> = Vec::new();

    for model in models {
        let mesh = &model.mesh;
        let offset = vertices.len() as u32;

        if !mesh.normals.is_empty() {
            debug!("子模型 '{}' 自带法线，将重新计算", model.name);
        }

        vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Vertex::new(Vector3::new(p[0], p[1], p[2]))),
        );

        // face_arities 为空表示全部是三角形
        let arities: Vec<u32> = if mesh.face_arities.is_empty() {
            vec![3; mesh.indices.len() / 3]
        } else {
            mesh.face_arities.clone()
        };

        let mut start = 0usize;
        for arity in arities {
            let end = start + arity as usize;
            if end > mesh.indices.len() {
                return Err(format!(
                    "子模型 '{}' 的面定义超出索引数组",
                    model.name
                ));
            }

            boundaries.push(polygons.len() as u32);
            for corner in start..end {
                let vertex = mesh.indices[corner] + offset;
                polygons.push(vertex);

                if use_texcoords {
                    let vertex = vertices
                        .get_mut(vertex as usize)
                        .ok_or_else(|| format!("顶点索引 {} 越界", vertex))?;
                    let tex = *mesh
                        .texcoord_indices
                        .get(corner)
                        .ok_or_else(|| format!("子模型 '{}' 的纹理坐标索引少于角数", model.name))?
                        as usize;
                    let uv = mesh
                        .texcoords
                        .get(2 * tex..2 * tex + 2)
                        .ok_or_else(|| format!("纹理坐标索引 {} 越界", tex))?;
                    let variant = vertex.add_texture_coordinate(Vector2::new(uv[0], uv[1]));
                    texture_indices.push(variant as u32);
                }
            }
            start = end;
        }
    }

    Mesh::new(
        vertices,
        polygons,
        boundaries,
        use_texcoords.then_some(texture_indices),
    )
}
