use crate::io::render_settings::RenderSettings;
use log::warn;
use std::path::Path;
use toml::Value;

/// TOML配置管理器 - 统一处理所有配置的读写
pub struct TomlConfigLoader;

impl TomlConfigLoader {
    /// 从TOML文件加载完整配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<RenderSettings, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("读取配置文件失败: {}", e))?;

        Self::load_from_content(&content)
    }

    /// 从TOML内容字符串加载配置
    pub fn load_from_content(content: &str) -> Result<RenderSettings, String> {
        let toml_value: Value =
            toml::from_str(content).map_err(|e| format!("解析TOML失败: {}", e))?;

        Self::parse_toml_to_settings(toml_value)
    }

    /// 保存配置到TOML文件
    pub fn save_to_file<P: AsRef<Path>>(settings: &RenderSettings, path: P) -> Result<(), String> {
        let toml_content = Self::settings_to_toml(settings);
        std::fs::write(path, toml_content).map_err(|e| format!("写入配置文件失败: {}", e))
    }

    pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<(), String> {
        let settings = RenderSettings {
            obj: Some("obj/simple/cube.obj".to_string()),
            wireframe: true,
            ..Default::default()
        };

        Self::save_to_file(&settings, path).map_err(|e| format!("创建示例配置失败: {}", e))
    }

    // ===== TOML -> RenderSettings 转换 =====

    fn parse_toml_to_settings(toml: Value) -> Result<RenderSettings, String> {
        let mut settings = RenderSettings::default();

        // [files] 部分
        if let Some(files) = toml.get("files").and_then(|v| v.as_table()) {
            Self::parse_files_section(&mut settings, files);
        }

        // [render] 部分
        if let Some(render) = toml.get("render").and_then(|v| v.as_table()) {
            Self::parse_render_section(&mut settings, render)?;
        }

        // [camera] 部分
        if let Some(camera) = toml.get("camera").and_then(|v| v.as_table()) {
            Self::parse_camera_section(&mut settings, camera);
        }

        // [object] 部分
        if let Some(object) = toml.get("object").and_then(|v| v.as_table()) {
            Self::parse_object_section(&mut settings, object);
        }

        // [shading] 部分
        if let Some(shading) = toml.get("shading").and_then(|v| v.as_table()) {
            Self::parse_shading_section(&mut settings, shading)?;
        }

        // [wireframe] 部分
        if let Some(wireframe) = toml.get("wireframe").and_then(|v| v.as_table()) {
            Self::parse_wireframe_section(&mut settings, wireframe);
        }

        Ok(settings)
    }

    // ===== 各个section的解析方法 =====

    fn parse_files_section(settings: &mut RenderSettings, files: &toml::Table) {
        if let Some(obj) = files.get("obj").and_then(|v| v.as_str()) {
            settings.obj = Some(obj.to_string());
        }
        if let Some(output) = files.get("output").and_then(|v| v.as_str()) {
            settings.output = output.to_string();
        }
        if let Some(output_dir) = files.get("output_dir").and_then(|v| v.as_str()) {
            settings.output_dir = output_dir.to_string();
        }
        if let Some(texture) = files.get("texture").and_then(|v| v.as_str()) {
            settings.texture = Some(texture.to_string());
        }
    }

    fn parse_render_section(
        settings: &mut RenderSettings,
        render: &toml::Table,
    ) -> Result<(), String> {
        if let Some(width) = render.get("width").and_then(|v| v.as_integer()) {
            settings.width = Self::positive_size("width", width)?;
        }
        if let Some(height) = render.get("height").and_then(|v| v.as_integer()) {
            settings.height = Self::positive_size("height", height)?;
        }
        if let Some(projection) = render.get("projection").and_then(|v| v.as_str()) {
            settings.projection = projection.to_string();
        }
        if let Some(use_gamma) = render.get("use_gamma").and_then(|v| v.as_bool()) {
            settings.use_gamma = use_gamma;
        }
        if let Some(save_depth) = render.get("save_depth").and_then(|v| v.as_bool()) {
            settings.save_depth = save_depth;
        }
        if let Some(background) = render.get("background_color").and_then(|v| v.as_str()) {
            settings.background_color = background.to_string();
        }
        if let Some(normalize) = render.get("normalize_model").and_then(|v| v.as_bool()) {
            settings.normalize_model = normalize;
        }
        Ok(())
    }

    fn parse_camera_section(settings: &mut RenderSettings, camera: &toml::Table) {
        if let Some(from) = camera.get("from").and_then(|v| v.as_str()) {
            settings.camera_from = from.to_string();
        }
        if let Some(at) = camera.get("at").and_then(|v| v.as_str()) {
            settings.camera_at = at.to_string();
        }
        if let Some(up) = camera.get("up").and_then(|v| v.as_str()) {
            settings.camera_up = up.to_string();
        }
        if let Some(fov) = Self::get_f32(camera, "fov") {
            settings.camera_fov = fov;
        }
        if let Some(ortho_height) = Self::get_f32(camera, "ortho_height") {
            settings.ortho_height = ortho_height;
        }
        if let Some(near) = Self::get_f32(camera, "near") {
            settings.near = near;
        }
        if let Some(far) = Self::get_f32(camera, "far") {
            settings.far = far;
        }
    }

    fn parse_object_section(settings: &mut RenderSettings, object: &toml::Table) {
        if let Some(position) = object.get("position").and_then(|v| v.as_str()) {
            settings.object_position = position.to_string();
        }
        if let Some(rotation) = object.get("rotation").and_then(|v| v.as_str()) {
            settings.object_rotation = rotation.to_string();
        }
        if let Some(scale_xyz) = object.get("scale_xyz").and_then(|v| v.as_str()) {
            settings.object_scale_xyz = scale_xyz.to_string();
        }
        if let Some(scale) = Self::get_f32(object, "scale") {
            settings.object_scale = scale;
        }
    }

    fn parse_shading_section(
        settings: &mut RenderSettings,
        shading: &toml::Table,
    ) -> Result<(), String> {
        if let Some(use_lighting) = shading.get("use_lighting").and_then(|v| v.as_bool()) {
            settings.use_lighting = use_lighting;
        }
        if let Some(ambient) = Self::get_f32(shading, "ambient") {
            if (0.0..=1.0).contains(&ambient) {
                settings.ambient = ambient;
            } else {
                warn!("无效的环境光强度 {}, 必须在 0-1 之间，使用默认值", ambient);
            }
        }
        if let Some(base_color) = shading.get("base_color").and_then(|v| v.as_str()) {
            settings.base_color = base_color.to_string();
        }
        if let Some(mode) = shading.get("mode").and_then(|v| v.as_str()) {
            settings.shading = match mode {
                "headlight" | "normal" => mode.to_string(),
                _ => return Err(format!("未知的着色模式: {}", mode)),
            };
        }
        Ok(())
    }

    fn parse_wireframe_section(settings: &mut RenderSettings, wireframe: &toml::Table) {
        if let Some(enabled) = wireframe.get("enabled").and_then(|v| v.as_bool()) {
            settings.wireframe = enabled;
        }
        if let Some(line_width) = wireframe.get("line_width").and_then(|v| v.as_integer()) {
            if (1..=64).contains(&line_width) {
                settings.line_width = line_width as u32;
            } else {
                warn!("无效的线宽 {}, 必须在 1-64 之间，使用默认值1", line_width);
            }
        }
        if let Some(color) = wireframe.get("color").and_then(|v| v.as_str()) {
            settings.wireframe_color = color.to_string();
        }
        if let Some(vertex_size) = wireframe.get("vertex_size").and_then(|v| v.as_integer()) {
            if (0..=64).contains(&vertex_size) {
                settings.vertex_size = vertex_size as u32;
            } else {
                warn!("无效的顶点大小 {}, 必须在 0-64 之间，已忽略", vertex_size);
            }
        }
    }

    /// 同时接受 `45` 与 `45.0` 两种写法
    fn get_f32(table: &toml::Table, key: &str) -> Option<f32> {
        match table.get(key)? {
            Value::Float(f) => Some(*f as f32),
            Value::Integer(i) => Some(*i as f32),
            other => {
                warn!("配置项 {} 需要数值，实际为 {}", key, other);
                None
            }
        }
    }

    fn positive_size(key: &str, value: i64) -> Result<usize, String> {
        if value > 0 {
            Ok(value as usize)
        } else {
            Err(format!("{} 必须大于0，实际为 {}", key, value))
        }
    }

    // ===== RenderSettings -> TOML 转换 =====

    fn settings_to_toml(settings: &RenderSettings) -> String {
        let mut content = String::new();

        content.push_str("# 网格光栅化渲染器配置文件\n");
        content.push_str("# 基于RenderSettings默认值生成的示例配置\n\n");

        // [files] 部分
        content.push_str("[files]\n");
        if let Some(obj) = &settings.obj {
            content.push_str(&format!("obj = \"{}\"\n", obj));
        } else {
            content.push_str("# obj = \"path/to/your/model.obj\"  # 取消注释并设置OBJ文件路径\n");
        }
        content.push_str(&format!("output = \"{}\"\n", settings.output));
        content.push_str(&format!("output_dir = \"{}\"\n", settings.output_dir));
        if let Some(texture) = &settings.texture {
            content.push_str(&format!("texture = \"{}\"\n", texture));
        } else {
            content.push_str("# texture = \"path/to/texture.png\"  # 可选：漫反射纹理\n");
        }
        content.push('\n');

        // [render] 部分
        content.push_str("[render]\n");
        content.push_str(&format!("width = {}\n", settings.width));
        content.push_str(&format!("height = {}\n", settings.height));
        content.push_str(&format!("projection = \"{}\"\n", settings.projection));
        content.push_str(&format!("use_gamma = {}\n", settings.use_gamma));
        content.push_str(&format!("save_depth = {}\n", settings.save_depth));
        content.push_str(&format!(
            "background_color = \"{}\"\n",
            settings.background_color
        ));
        content.push_str(&format!("normalize_model = {}\n", settings.normalize_model));
        content.push('\n');

        // [camera] 部分
        content.push_str("[camera]\n");
        content.push_str(&format!("from = \"{}\"\n", settings.camera_from));
        content.push_str(&format!("at = \"{}\"\n", settings.camera_at));
        content.push_str(&format!("up = \"{}\"\n", settings.camera_up));
        content.push_str(&format!("fov = {:?}\n", settings.camera_fov));
        content.push_str(&format!("ortho_height = {:?}\n", settings.ortho_height));
        content.push_str(&format!("near = {:?}\n", settings.near));
        content.push_str(&format!("far = {:?}\n", settings.far));
        content.push('\n');

        // [object] 部分
        content.push_str("[object]\n");
        content.push_str(&format!("position = \"{}\"\n", settings.object_position));
        content.push_str(&format!("rotation = \"{}\"\n", settings.object_rotation));
        content.push_str(&format!("scale_xyz = \"{}\"\n", settings.object_scale_xyz));
        content.push_str(&format!("scale = {:?}\n", settings.object_scale));
        content.push('\n');

        // [shading] 部分
        content.push_str("[shading]\n");
        content.push_str(&format!("mode = \"{}\"\n", settings.shading));
        content.push_str(&format!("use_lighting = {}\n", settings.use_lighting));
        content.push_str(&format!("ambient = {:?}\n", settings.ambient));
        content.push_str(&format!("base_color = \"{}\"\n", settings.base_color));
        content.push('\n');

        // [wireframe] 部分
        content.push_str("[wireframe]\n");
        content.push_str(&format!("enabled = {}\n", settings.wireframe));
        content.push_str(&format!("line_width = {}\n", settings.line_width));
        content.push_str(&format!("color = \"{}\"\n", settings.wireframe_color));
        content.push_str(&format!("vertex_size = {}\n", settings.vertex_size));
        content.push_str("# line_width: 线宽（像素），较陡的粗线可能出现缝隙\n");
        content.push_str("# vertex_size: 顶点高亮圆盘直径，0 表示关闭\n");

        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_gives_defaults() {
        let settings = TomlConfigLoader::load_from_content("").unwrap();
        assert_eq!(settings, RenderSettings::default());
    }

    #[test]
    fn sections_override_defaults() {
        let content = r#"
            [files]
            obj = "models/quad.obj"

            [render]
            width = 320
            height = 240
            projection = "orthographic"

            [camera]
            fov = 60
            near = 0.5

            [shading]
            mode = "normal"
            ambient = 0.3

            [wireframe]
            enabled = true
            line_width = 3
            vertex_size = 5
        "#;
        let settings = TomlConfigLoader::load_from_content(content).unwrap();
        assert_eq!(settings.obj.as_deref(), Some("models/quad.obj"));
        assert_eq!((settings.width, settings.height), (320, 240));
        assert!(!settings.is_perspective());
        assert_eq!(settings.camera_fov, 60.0);
        assert_eq!(settings.near, 0.5);
        assert_eq!(settings.shading, "normal");
        assert_eq!(settings.ambient, 0.3);
        assert!(settings.wireframe);
        assert_eq!(settings.line_width, 3);
        assert_eq!(settings.vertex_size, 5);
    }

    #[test]
    fn out_of_range_values_keep_defaults() {
        let content = r#"
            [shading]
            ambient = 4.0

            [wireframe]
            line_width = 0
        "#;
        let settings = TomlConfigLoader::load_from_content(content).unwrap();
        assert_eq!(settings.ambient, RenderSettings::default().ambient);
        assert_eq!(settings.line_width, 1);
    }

    #[test]
    fn invalid_input_is_an_error() {
        assert!(TomlConfigLoader::load_from_content("[render\nwidth = 1").is_err());
        assert!(TomlConfigLoader::load_from_content("[render]\nwidth = 0").is_err());
        assert!(TomlConfigLoader::load_from_content("[shading]\nmode = \"pbr\"").is_err());
    }

    #[test]
    fn written_config_reads_back() {
        let settings = RenderSettings {
            obj: Some("a.obj".to_string()),
            width: 200,
            line_width: 2,
            camera_fov: 30.0,
            ..Default::default()
        };
        let content = TomlConfigLoader::settings_to_toml(&settings);
        let loaded = TomlConfigLoader::load_from_content(&content).unwrap();
        assert_eq!(loaded, settings);
    }
}
