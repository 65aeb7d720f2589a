use softras::math::{Mat4, Vec3};
use softras::mesh::Mesh;
use softras::render::renderer::Renderer;
use softras::render::state::RenderState;
use softras::shaders::{BlinnPhongShader, ColorVertex, DepthShader, VertexColorShader};
use softras::texture::DepthMap;
use softras::window::{FrameLimiter, Window, WindowEvent, FPS, WINDOW_HEIGHT, WINDOW_WIDTH};

const SHADOW_DIM: i32 = 512;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scene {
    HelloTriangle,
    ShadowedCube,
}

fn format_title(renderer: &Renderer, scene: Scene) -> String {
    format!(
        "Softras | {} | cull: {} | wire: {} | depth: {} | 1/2 scene, C/W/D flags, S snapshot",
        match scene {
            Scene::HelloTriangle => "hello triangle",
            Scene::ShadowedCube => "shadowed cube",
        },
        if renderer.is_enabled(RenderState::CULL_FACE) { "on" } else { "off" },
        if renderer.is_enabled(RenderState::WIREFRAME) { "on" } else { "off" },
        if renderer.is_enabled(RenderState::DEPTH_TEST) { "on" } else { "off" },
    )
}

fn draw_hello_triangle(renderer: &mut Renderer, shader: &mut VertexColorShader) {
    let verts = [
        ColorVertex::new(Vec3::new(-0.5, -0.5, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        ColorVertex::new(Vec3::new(0.5, -0.5, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        ColorVertex::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, 0.0, 1.0)),
    ];
    shader.mvp = Mat4::identity();
    renderer.process_triangle(shader, &verts[0], &verts[1], &verts[2]);
}

struct CubeScene {
    cube: Mesh,
    floor: Mesh,
    angle: f32,
}

impl CubeScene {
    fn new() -> Self {
        Self {
            cube: Mesh::unit_cube(),
            floor: Mesh::ground_plane(),
            angle: 0.0,
        }
    }

    fn draw(&self, renderer: &mut Renderer, shadow_pass: &mut Renderer, depth_shader: &mut DepthShader) {
        let aspect = renderer.width() as f32 / renderer.height() as f32;
        let projection = Mat4::perspective_lh(60f32.to_radians(), aspect, 0.1, 100.0);
        let view = Mat4::look_at_lh(
            Vec3::new(0.0, 1.5, -4.0),
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );

        let light_pos = Vec3::new(2.0, 4.0, -2.0);
        let light_proj = Mat4::perspective_lh(90f32.to_radians(), 1.0, 0.5, 20.0);
        let light_view = Mat4::look_at_lh(light_pos, Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let light_space = light_proj * light_view;

        let cube_model = Mat4::translation(0.0, 0.75, 0.0)
            * Mat4::rotation_y(self.angle)
            * Mat4::scaling(0.5, 0.5, 0.5);
        let floor_model = Mat4::scaling(4.0, 1.0, 4.0);

        // Pass 1: depth only, from the light's point of view.
        shadow_pass.clear(0.0, 0.0, 0.0, 1.0);
        for (mesh, model) in [(&self.cube, cube_model), (&self.floor, floor_model)] {
            depth_shader.light_mvp = light_space * model;
            for [a, b, c] in mesh.triangles() {
                shadow_pass.process_triangle(depth_shader, a, b, c);
            }
        }
        let shadow_map = DepthMap::from_renderer(shadow_pass);

        // Pass 2: lit scene sampling the shadow map. The shader borrows the
        // per-frame shadow map, so it lives for this pass only.
        let mut shader = BlinnPhongShader::new();
        shader.light_space = light_space;
        shader.light_pos = light_pos;
        shader.light_dir = (Vec3::ZERO - light_pos).normalize();
        shader.view_pos = Vec3::new(0.0, 1.5, -4.0);
        shader.point_light = true;
        shader.shadow_map = Some(&shadow_map);

        let vp = projection * view;
        for (mesh, model, color) in [
            (&self.cube, cube_model, Vec3::new(0.9, 0.4, 0.2)),
            (&self.floor, floor_model, Vec3::new(0.6, 0.6, 0.65)),
        ] {
            shader.mvp = vp * model;
            shader.model = model;
            shader.normal_matrix = model;
            shader.base_color = color;
            for [a, b, c] in mesh.triangles() {
                renderer.process_triangle(&mut shader, a, b, c);
            }
        }
    }
}

fn main() -> Result<(), String> {
    env_logger::init();

    let mut window = Window::new("Softras", WINDOW_WIDTH, WINDOW_HEIGHT)?;
    let mut renderer = Renderer::new(WINDOW_WIDTH as i32, WINDOW_HEIGHT as i32);
    let mut shadow_pass = Renderer::new(SHADOW_DIM, SHADOW_DIM);
    renderer.enable(RenderState::DEPTH_TEST);
    shadow_pass.enable(RenderState::DEPTH_TEST);

    let mut triangle_shader = VertexColorShader::new();
    let mut depth_shader = DepthShader::new();
    let mut cube_scene = CubeScene::new();

    let mut scene = Scene::ShadowedCube;
    let mut frame_limiter = FrameLimiter::new(FPS);

    log::info!("starting demo, scene: shadowed cube");
    loop {
        match window.poll_events() {
            WindowEvent::Quit => break,
            WindowEvent::Resize(w, h) => {
                // The raster capacity caps how large the streaming texture
                // may grow.
                let w = (w as i32).clamp(2, softras::render::framebuffer::MAX_WIDTH);
                let h = (h as i32).clamp(2, softras::render::framebuffer::MAX_HEIGHT);
                window.resize(w as u32, h as u32)?;
                renderer.set_viewport(w, h);
            }
            WindowEvent::KeyPress(key) => {
                use sdl2::keyboard::Keycode;
                match key {
                    Keycode::Escape => break,
                    Keycode::Num1 => scene = Scene::HelloTriangle,
                    Keycode::Num2 => scene = Scene::ShadowedCube,
                    Keycode::C => renderer.toggle(RenderState::CULL_FACE),
                    Keycode::W => renderer.toggle(RenderState::WIREFRAME),
                    Keycode::D => renderer.toggle(RenderState::DEPTH_TEST),
                    Keycode::S => {
                        renderer
                            .write_to_file("snapshot.png", true)
                            .map_err(|e| e.to_string())?;
                        log::info!("wrote snapshot.png");
                    }
                    _ => {}
                }
                window.set_title(&format_title(&renderer, scene));
            }
            WindowEvent::None => {}
        }

        let delta = frame_limiter.wait_and_get_delta();

        renderer.clear(0.08, 0.08, 0.1, 1.0);
        match scene {
            Scene::HelloTriangle => draw_hello_triangle(&mut renderer, &mut triangle_shader),
            Scene::ShadowedCube => {
                cube_scene.angle += 0.6 * delta;
                cube_scene.draw(&mut renderer, &mut shadow_pass, &mut depth_shader);
            }
        }

        window.present(renderer.color_buffer())?;
    }

    Ok(())
}
